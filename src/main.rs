//! Artifact sweeper entry point.
//!
//! Resolves the requested artifact names against the container service's
//! listing, hands the resolved batch to the delete engine, and publishes
//! the batch report as workflow outputs. Per-target delete failures are
//! reported, never fatal; only engine malfunction or a resolution error
//! exits non-zero.

use std::{collections::HashMap, fs::OpenOptions, io::Write, path::Path};

use anyhow::{bail, Context, Result};
use sweeper_core::Artifact;
use sweeper_engine::{BatchReport, ClientConfig, DeleteEngine, EngineConfig, RetryPolicy};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("starting artifact sweeper");

    let config = Config::from_env()?;
    info!(
        artifact_url = %config.artifact_url(),
        concurrency = config.concurrency,
        retry_limit = config.retry_limit,
        delete_all = config.names.is_empty(),
        "configuration loaded"
    );

    let engine = DeleteEngine::new(config.engine_config())
        .context("failed to initialize delete engine")?;

    let listing = engine
        .list_artifacts(&config.artifact_url())
        .await
        .context("failed to list artifacts")?;
    info!(available = listing.value.len(), "artifact listing fetched");

    let targets = resolve_targets(listing.value, &config.names)?;
    info!(total = targets.len(), "artifacts scheduled for deletion");

    let report = engine.delete_artifacts(targets).await.context("delete engine failed")?;

    if report.failed.count > 0 {
        warn!(
            failed = report.failed.count,
            names = ?report.failed.names,
            "some artifacts could not be deleted"
        );
    }

    publish_outputs(&report).context("failed to publish outputs")?;

    info!(
        deleted = report.deleted.count,
        failed = report.failed.count,
        "artifact sweep finished"
    );
    Ok(())
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,sweeper_engine=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Sweeper configuration resolved from the environment.
struct Config {
    /// Base URL of the runtime's pipeline service.
    runtime_url: String,
    /// Workflow run whose artifacts are addressed.
    run_id: String,
    /// Bearer token for the runtime service.
    token: String,
    /// API version advertised on every call.
    api_version: String,
    /// Requested artifact names; empty means delete everything listed.
    names: Vec<String>,
    /// Delete worker count.
    concurrency: usize,
    /// Retry budget per artifact.
    retry_limit: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    fn from_env() -> Result<Self> {
        let runtime_url = std::env::var("ACTIONS_RUNTIME_URL")
            .context("ACTIONS_RUNTIME_URL environment variable not set")?;
        let run_id = std::env::var("GITHUB_RUN_ID")
            .context("GITHUB_RUN_ID environment variable not set")?;
        let token = std::env::var("ACTIONS_RUNTIME_TOKEN")
            .context("ACTIONS_RUNTIME_TOKEN environment variable not set")?;

        let api_version = std::env::var("ARTIFACT_API_VERSION")
            .unwrap_or_else(|_| "6.0-preview".to_string());

        let names = parse_name_list(&std::env::var("INPUT_NAME").unwrap_or_default());

        let concurrency = std::env::var("DELETE_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(sweeper_engine::DEFAULT_DELETE_CONCURRENCY);

        let retry_limit = std::env::var("RETRY_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(sweeper_engine::DEFAULT_RETRY_LIMIT);

        Ok(Self { runtime_url, run_id, token, api_version, names, concurrency, retry_limit })
    }

    /// Artifact collection URL for this workflow run.
    fn artifact_url(&self) -> String {
        let base = self.runtime_url.trim_end_matches('/');
        format!(
            "{base}/_apis/pipelines/workflows/{}/artifacts?api-version={}",
            self.run_id, self.api_version
        )
    }

    /// Engine configuration derived from this environment.
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            concurrency: self.concurrency,
            retry_policy: RetryPolicy { retry_limit: self.retry_limit, ..Default::default() },
            client_config: ClientConfig {
                api_version: self.api_version.clone(),
                bearer_token: Some(self.token.clone()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Splits the raw name input into trimmed, non-empty artifact names.
fn parse_name_list(raw: &str) -> Vec<String> {
    raw.lines().map(str::trim).filter(|name| !name.is_empty()).map(str::to_string).collect()
}

/// Resolves the requested names against the listing.
///
/// An empty request is the delete-all directive and resolves to the full
/// listing. Any requested name absent from the listing is an error before
/// the engine runs.
fn resolve_targets(available: Vec<Artifact>, names: &[String]) -> Result<Vec<Artifact>> {
    if names.is_empty() {
        return Ok(available);
    }

    let mut by_name: HashMap<String, Artifact> =
        available.into_iter().map(|artifact| (artifact.name.clone(), artifact)).collect();

    let mut targets = Vec::with_capacity(names.len());
    let mut missing = Vec::new();
    for name in names {
        match by_name.remove(name) {
            Some(artifact) => targets.push(artifact),
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        bail!("unable to find the following artifacts: {}", missing.join(", "));
    }

    Ok(targets)
}

/// Publishes the report as workflow outputs.
///
/// Appends `failed`, `deleted`, and `artifacts` to the file named by
/// `GITHUB_OUTPUT`; logs them when the variable is unset.
fn publish_outputs(report: &BatchReport) -> Result<()> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) => write_outputs(Path::new(&path), report),
        None => {
            info!(
                failed = %serde_json::to_string(&report.failed)?,
                deleted = %serde_json::to_string(&report.deleted)?,
                "outputs (GITHUB_OUTPUT not set)"
            );
            Ok(())
        },
    }
}

/// Appends the report outputs to an output file in `key=json` form.
fn write_outputs(path: &Path, report: &BatchReport) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open output file {}", path.display()))?;

    writeln!(file, "failed={}", serde_json::to_string(&report.failed)?)?;
    writeln!(file, "deleted={}", serde_json::to_string(&report.deleted)?)?;
    writeln!(file, "artifacts={}", serde_json::to_string(&report.artifacts)?)?;

    Ok(())
}
