//! Registry client with throttling and bounded retries.
//!
//! Every attempt, retries included, goes through the shared [`Throttle`].
//! Responses are classified as found, rejected (never retried) or transient
//! (retried per the [`BackoffPolicy`] until the attempt budget runs out).

use super::backoff::BackoffPolicy;
use super::record::RegistryRecord;
use super::throttle::Throttle;
use super::transport::{RegistryResponse, RegistryTransport};
use crate::constants::{NOT_FOUND_STATUSES, RETRYABLE_STATUSES};
use crate::identifier::Cnpj;
use crate::models::{FailureKind, LookupResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Lookup result plus what it took to get it
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub result: LookupResult,
    pub attempts: u32,
    /// Backoff delays slept between attempts, in order
    pub delays: Vec<Duration>,
}

/// How a single attempt ended
#[derive(Debug)]
enum Attempt {
    Found(Box<RegistryRecord>),
    Rejected(String),
    Transient(String),
}

pub struct RegistryClient {
    transport: Arc<dyn RegistryTransport>,
    policy: BackoffPolicy,
    throttle: Throttle,
}

impl RegistryClient {
    pub fn new(
        transport: Arc<dyn RegistryTransport>,
        policy: BackoffPolicy,
        min_interval: Duration,
    ) -> Self {
        Self {
            transport,
            policy,
            throttle: Throttle::new(min_interval),
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Resolve one identifier
    pub async fn lookup(&self, cnpj: &Cnpj) -> LookupResult {
        self.lookup_traced(cnpj).await.result
    }

    /// Resolve one identifier and report attempts and backoff delays
    pub async fn lookup_traced(&self, cnpj: &Cnpj) -> LookupOutcome {
        let mut attempts = 0u32;
        let mut delays = Vec::new();

        loop {
            self.throttle.acquire().await;
            attempts += 1;
            debug!("Lookup {} attempt {}/{}", cnpj, attempts, self.policy.max_attempts);

            let attempt = match self.transport.fetch(cnpj).await {
                Ok(response) => classify(&response),
                Err(e) => Attempt::Transient(e.to_string()),
            };

            let result = match attempt {
                Attempt::Found(record) => {
                    info!("Resolved {} after {} attempt(s)", cnpj, attempts);
                    LookupResult::Success {
                        identifier: cnpj.to_string(),
                        record: *record,
                    }
                }
                Attempt::Rejected(detail) => {
                    warn!("Registry has no record for {}: {}", cnpj, detail);
                    LookupResult::failure(FailureKind::NotFound, cnpj.as_str(), detail)
                }
                Attempt::Transient(detail) if !self.policy.allows_retry(attempts) => {
                    warn!(
                        "Giving up on {} after {} attempt(s): {}",
                        cnpj, attempts, detail
                    );
                    LookupResult::failure(FailureKind::Unavailable, cnpj.as_str(), detail)
                }
                Attempt::Transient(detail) => {
                    let delay = self.policy.delay_for(attempts);
                    warn!(
                        "Transient failure for {} ({}), retrying in {:?}",
                        cnpj, detail, delay
                    );
                    delays.push(delay);
                    sleep(delay).await;
                    continue;
                }
            };

            return LookupOutcome {
                result,
                attempts,
                delays,
            };
        }
    }
}

/// Sort a registry response into found, rejected or transient
fn classify(response: &RegistryResponse) -> Attempt {
    let status = response.status;

    if status == 200 {
        return match RegistryRecord::from_json(&response.body) {
            Ok(record) => Attempt::Found(Box::new(record)),
            Err(e) => Attempt::Transient(format!("unreadable response body: {e}")),
        };
    }

    let detail = match error_message(&response.body) {
        Some(message) => format!("HTTP {status}: {message}"),
        None => format!("HTTP {status}"),
    };

    if NOT_FOUND_STATUSES.contains(&status) {
        Attempt::Rejected(detail)
    } else if RETRYABLE_STATUSES.contains(&status) || (500..600).contains(&status) {
        Attempt::Transient(detail)
    } else {
        Attempt::Rejected(detail)
    }
}

/// The `message` field of a JSON error body, if any
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
