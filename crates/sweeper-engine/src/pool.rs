//! Slot-indexed pool of replaceable HTTP clients.
//!
//! Exposes one connection handle per worker slot. A handle that served a
//! failed or ambiguous response may carry desynchronized transport state,
//! so the retry controller replaces its slot before every retry instead of
//! reusing the handle that just failed.

use tokio::sync::RwLock;

use crate::{
    client::{build_client, ClientConfig},
    error::Result,
};

/// Fixed-size pool of independently replaceable clients, one per worker.
#[derive(Debug)]
pub struct ClientPool {
    slots: Vec<RwLock<reqwest::Client>>,
    config: ClientConfig,
}

impl ClientPool {
    /// Creates a pool with `size` freshly built clients.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DeleteError::Configuration`] if a client cannot be
    /// built from the configuration.
    pub fn new(size: usize, config: ClientConfig) -> Result<Self> {
        let mut slots = Vec::with_capacity(size);
        for _ in 0..size {
            slots.push(RwLock::new(build_client(&config)?));
        }
        Ok(Self { slots, config })
    }

    /// Number of slots in the pool.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// The configuration the pooled clients are built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the client currently held at `slot`.
    ///
    /// Cloning a reqwest client is a cheap handle copy; the underlying
    /// connections stay shared until the slot is replaced.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= size()`.
    pub async fn client(&self, slot: usize) -> reqwest::Client {
        self.slots[slot].read().await.clone()
    }

    /// Discards the client at `slot` and installs a fresh one.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= size()`.
    pub async fn replace(&self, slot: usize) -> Result<()> {
        let fresh = build_client(&self.config)?;
        *self.slots[slot].write().await = fresh;
        Ok(())
    }

    /// Discards every pooled client, installing fresh ones.
    pub async fn dispose_all(&self) -> Result<()> {
        for slot in 0..self.slots.len() {
            self.replace(slot).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_exposes_configured_slot_count() {
        let pool = ClientPool::new(4, ClientConfig::default()).unwrap();
        assert_eq!(pool.size(), 4);
    }

    #[tokio::test]
    async fn replace_installs_a_usable_client() {
        let pool = ClientPool::new(2, ClientConfig::default()).unwrap();

        pool.replace(1).await.unwrap();

        // The replaced slot still hands out a client handle.
        let _client = pool.client(1).await;
    }

    #[tokio::test]
    async fn dispose_all_refreshes_every_slot() {
        let pool = ClientPool::new(3, ClientConfig::default()).unwrap();

        pool.dispose_all().await.unwrap();

        for slot in 0..pool.size() {
            let _client = pool.client(slot).await;
        }
    }
}
