//! Integration tests for the delete engine against a mock container
//! service.
//!
//! Every test injects a `TestClock`, so backoff sequences that would span
//! many real seconds complete immediately while the clock still records
//! the full waited duration.

use std::{sync::Arc, time::Duration};

use sweeper_core::{Artifact, TestClock};
use sweeper_engine::{DeleteEngine, EngineConfig, RetryPolicy};
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn artifact(server: &MockServer, name: &str) -> Artifact {
    Artifact {
        name: name.to_string(),
        url: format!("{}/artifacts/{name}", server.uri()),
        size: 1024,
        kind: "actions_storage".to_string(),
        container_id: "11".to_string(),
    }
}

fn test_engine(concurrency: usize, retry_limit: u32) -> (DeleteEngine, TestClock) {
    let clock = TestClock::new();
    let config = EngineConfig {
        concurrency,
        retry_policy: RetryPolicy { retry_limit, jitter_factor: 0.0, ..Default::default() },
        ..Default::default()
    };
    let engine =
        DeleteEngine::with_clock(config, Arc::new(clock.clone())).expect("engine should build");
    (engine, clock)
}

#[tokio::test]
async fn batch_of_five_deletes_cleanly_with_concurrency_two() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("DELETE"))
        .and(matchers::path_regex("^/artifacts/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(5)
        .mount(&server)
        .await;

    let (engine, _clock) = test_engine(2, 5);
    let batch: Vec<_> = (0..5).map(|i| artifact(&server, &format!("artifact-{i}"))).collect();

    let report = engine.delete_artifacts(batch).await.expect("batch should complete");

    assert_eq!(report.deleted.count, 5);
    assert_eq!(report.failed.count, 0);
    assert!(report.failed.names.is_empty());
    assert!(report.is_complete_for(5));

    server.verify().await;
}

#[tokio::test]
async fn throttled_delete_honors_retry_after_before_second_attempt() {
    let server = MockServer::start().await;

    // First attempt is throttled with a server-directed wait; the retry
    // falls through to the success mock.
    Mock::given(matchers::method("DELETE"))
        .and(matchers::path("/artifacts/throttled"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_string("Too Many Requests")
                .append_header("Retry-After", "2"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(matchers::method("DELETE"))
        .and(matchers::path("/artifacts/throttled"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, clock) = test_engine(1, 5);

    let report = engine
        .delete_artifacts(vec![artifact(&server, "throttled")])
        .await
        .expect("batch should complete");

    assert_eq!(report.deleted.names, vec!["throttled"]);
    assert!(
        clock.elapsed() >= Duration::from_secs(2),
        "second attempt started after {:?}, before the directed 2s wait",
        clock.elapsed()
    );

    server.verify().await;
}

#[tokio::test]
async fn retryable_status_exhausts_budget_after_limit_plus_one_attempts() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("DELETE"))
        .and(matchers::path("/artifacts/flaky"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(4)
        .mount(&server)
        .await;

    let (engine, clock) = test_engine(1, 3);

    let report = engine
        .delete_artifacts(vec![artifact(&server, "flaky")])
        .await
        .expect("batch should complete despite the failure");

    assert_eq!(report.failed.names, vec!["flaky"]);
    assert_eq!(report.deleted.count, 0);
    assert!(report.is_complete_for(1));

    // Three backoffs: 2s + 4s + 8s with a 1s base and no jitter.
    assert_eq!(clock.elapsed(), Duration::from_secs(14));

    server.verify().await;
}

#[tokio::test]
async fn fatal_status_fails_after_exactly_one_attempt_with_zero_wait() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("DELETE"))
        .and(matchers::path("/artifacts/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, clock) = test_engine(2, 5);

    let report = engine
        .delete_artifacts(vec![artifact(&server, "missing")])
        .await
        .expect("batch should complete despite the failure");

    assert_eq!(report.failed.names, vec!["missing"]);
    assert_eq!(clock.elapsed(), Duration::ZERO, "fatal outcomes must not wait");

    server.verify().await;
}

#[tokio::test]
async fn one_fatal_target_never_blocks_its_siblings() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("DELETE"))
        .and(matchers::path("/artifacts/doomed"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(matchers::method("DELETE"))
        .and(matchers::path_regex("^/artifacts/ok-"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let (engine, _clock) = test_engine(2, 5);
    let batch = vec![
        artifact(&server, "doomed"),
        artifact(&server, "ok-1"),
        artifact(&server, "ok-2"),
    ];

    let report = engine.delete_artifacts(batch).await.expect("batch should complete");

    assert_eq!(report.failed.names, vec!["doomed"]);
    assert_eq!(report.deleted.count, 2);
    assert!(report.is_complete_for(3));
    assert_eq!(report.artifacts["doomed"].container_id, "11");

    server.verify().await;
}

#[tokio::test]
async fn malformed_retry_after_falls_back_to_exponential_backoff() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("DELETE"))
        .and(matchers::path("/artifacts/odd"))
        .respond_with(
            ResponseTemplate::new(429).append_header("Retry-After", "soonish"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(matchers::method("DELETE"))
        .and(matchers::path("/artifacts/odd"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (engine, clock) = test_engine(1, 5);

    let report = engine
        .delete_artifacts(vec![artifact(&server, "odd")])
        .await
        .expect("batch should complete");

    assert_eq!(report.deleted.names, vec!["odd"]);
    // First exponential backoff with a 1s base: 2s, not an attempt failure.
    assert_eq!(clock.elapsed(), Duration::from_secs(2));
}

#[tokio::test]
async fn listing_fetches_artifact_descriptors() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "count": 2,
        "value": [
            {"name": "a", "url": "https://service.example.com/a", "size": 1, "type": "t", "containerId": "1"},
            {"name": "b", "url": "https://service.example.com/b", "size": 2, "type": "t", "containerId": "1"}
        ]
    });

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/_apis/pipelines/workflows/99/artifacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, _clock) = test_engine(2, 5);
    let url = format!("{}/_apis/pipelines/workflows/99/artifacts?api-version=6.0-preview", server.uri());

    let listing = engine.list_artifacts(&url).await.expect("listing should succeed");
    assert_eq!(listing.count, 2);
    assert_eq!(listing.value.len(), 2);
    assert_eq!(listing.value[0].name, "a");

    server.verify().await;
}

#[tokio::test]
async fn listing_retries_transient_failures() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/_apis/pipelines/workflows/99/artifacts"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/_apis/pipelines/workflows/99/artifacts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"count": 0, "value": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (engine, clock) = test_engine(1, 5);
    let url = format!("{}/_apis/pipelines/workflows/99/artifacts?api-version=6.0-preview", server.uri());

    let listing = engine.list_artifacts(&url).await.expect("listing should recover");
    assert_eq!(listing.count, 0);
    assert_eq!(clock.elapsed(), Duration::from_secs(6), "two exponential backoffs: 2s + 4s");

    server.verify().await;
}

#[tokio::test]
async fn listing_fails_fast_on_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, clock) = test_engine(1, 5);
    let url = format!("{}/_apis/pipelines/workflows/99/artifacts", server.uri());

    let error = engine.list_artifacts(&url).await.expect_err("401 must not be retried");
    assert!(matches!(error, sweeper_engine::DeleteError::UnexpectedStatus { status_code: 401 }));
    assert_eq!(clock.elapsed(), Duration::ZERO);

    server.verify().await;
}
