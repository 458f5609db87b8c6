//! Retry, rejection and throttling behaviour of the registry client

use super::{ScriptedTransport, company_body};
use crate::identifier::Cnpj;
use crate::models::{FailureKind, LookupResult};
use crate::registry::{BackoffPolicy, RegistryClient, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const ID: &str = "11222333000181";

fn cnpj() -> Cnpj {
    Cnpj::parse(ID).unwrap()
}

fn policy() -> BackoffPolicy {
    BackoffPolicy::default()
        .with_max_attempts(4)
        .with_base_delay(Duration::from_millis(800))
        .with_max_delay(Duration::from_secs(10))
}

fn client(transport: Arc<ScriptedTransport>, policy: BackoffPolicy) -> RegistryClient {
    RegistryClient::new(transport, policy, Duration::from_millis(150))
}

#[tokio::test(start_paused = true)]
async fn test_two_transient_failures_then_success() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .status(ID, 503)
            .reply(ID, Err(TransportError::Timeout))
            .ok(ID, &company_body(ID, "EMPRESA A")),
    );
    let client = client(transport.clone(), policy());

    let outcome = client.lookup_traced(&cnpj()).await;

    assert!(outcome.result.is_success());
    assert_eq!(outcome.attempts, 3);
    assert_eq!(transport.calls(), 3);
    assert_eq!(
        outcome.delays,
        vec![Duration::from_millis(800), Duration::from_millis(1600)]
    );
    assert!(outcome.delays.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(start_paused = true)]
async fn test_not_found_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::new().status(ID, 404));
    let client = client(transport.clone(), policy());

    let outcome = client.lookup_traced(&cnpj()).await;

    assert_eq!(outcome.attempts, 1);
    assert!(outcome.delays.is_empty());
    assert_eq!(transport.calls(), 1);
    match outcome.result {
        LookupResult::Failure {
            kind, identifier, ..
        } => {
            assert_eq!(kind, FailureKind::NotFound);
            assert_eq!(identifier, ID);
        }
        other => panic!("Expected NotFound failure, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_bad_request_is_not_found() {
    let transport = Arc::new(ScriptedTransport::new().status(ID, 400));
    let client = client(transport.clone(), policy());

    let result = client.lookup(&cnpj()).await;

    assert_eq!(result.failure_kind(), Some(FailureKind::NotFound));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_rate_limit_becomes_unavailable() {
    let transport = Arc::new(ScriptedTransport::new().status(ID, 429));
    let client = client(transport.clone(), policy());

    let outcome = client.lookup_traced(&cnpj()).await;

    assert_eq!(outcome.result.failure_kind(), Some(FailureKind::Unavailable));
    assert_eq!(outcome.attempts, 4);
    assert_eq!(transport.calls(), 4);
    assert_eq!(
        outcome.delays,
        vec![
            Duration::from_millis(800),
            Duration::from_millis(1600),
            Duration::from_millis(3200),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_detail_keeps_last_error() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .status(ID, 500)
            .reply(ID, Err(TransportError::Network("connection reset".into()))),
    );
    let client = client(transport, policy().with_max_attempts(2));

    match client.lookup(&cnpj()).await {
        LookupResult::Failure { kind, detail, .. } => {
            assert_eq!(kind, FailureKind::Unavailable);
            assert_eq!(detail, "network error: connection reset");
        }
        other => panic!("Expected Unavailable failure, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_policy_never_sleeps() {
    let transport = Arc::new(ScriptedTransport::new().status(ID, 502));
    let client = client(transport.clone(), policy().with_max_attempts(1));
    let start = Instant::now();

    let outcome = client.lookup_traced(&cnpj()).await;

    assert_eq!(outcome.result.failure_kind(), Some(FailureKind::Unavailable));
    assert_eq!(outcome.attempts, 1);
    assert!(outcome.delays.is_empty());
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_delays_capped_at_max_delay() {
    let transport = Arc::new(ScriptedTransport::new().status(ID, 503));
    let policy = policy()
        .with_max_attempts(5)
        .with_max_delay(Duration::from_secs(2));
    let client = client(transport, policy);

    let outcome = client.lookup_traced(&cnpj()).await;

    assert_eq!(
        outcome.delays,
        vec![
            Duration::from_millis(800),
            Duration::from_millis(1600),
            Duration::from_secs(2),
            Duration::from_secs(2),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_sequential_lookups_respect_min_interval() {
    let other = "00000000000191";
    let transport = Arc::new(
        ScriptedTransport::new()
            .ok(ID, &company_body(ID, "A"))
            .ok(other, &company_body(other, "B")),
    );
    let client = client(transport, policy());
    let start = Instant::now();

    client.lookup(&cnpj()).await;
    client.lookup(&Cnpj::parse(other).unwrap()).await;
    client.lookup(&cnpj()).await;

    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_success_carries_record() {
    let transport = Arc::new(ScriptedTransport::new().ok(ID, &company_body(ID, "EMPRESA A")));
    let client = client(transport, policy());

    match client.lookup(&cnpj()).await {
        LookupResult::Success { identifier, record } => {
            assert_eq!(identifier, ID);
            assert_eq!(record.legal_name, "EMPRESA A");
            assert!(record.primary_activity().is_some());
            assert_eq!(record.secondary_activities.len(), 1);
        }
        other => panic!("Expected success, got {other:?}"),
    }
}
