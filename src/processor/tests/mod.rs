//! Pipeline tests for the batch processor
//!
//! Runs whole batches against scripted transports on a paused clock.

pub mod error_handling;

use crate::config::LookupConfig;
use crate::models::InputIdentifier;
use crate::processor::BatchProcessor;
use crate::registry::{BackoffPolicy, RegistryClient, RegistryTransport};
use std::sync::Arc;
use std::time::Duration;

/// Raw identifiers as they would come from rows 2, 3, ...
pub(crate) fn inputs(raws: &[&str]) -> Vec<InputIdentifier> {
    raws.iter()
        .enumerate()
        .map(|(i, raw)| InputIdentifier {
            row: i + 2,
            raw: raw.to_string(),
        })
        .collect()
}

pub(crate) fn processor(transport: Arc<dyn RegistryTransport>, concurrency: usize) -> BatchProcessor {
    let config = LookupConfig::default()
        .with_concurrency(concurrency)
        .without_progress();
    let client = RegistryClient::new(
        transport,
        BackoffPolicy::default(),
        Duration::from_millis(150),
    );
    BatchProcessor::new(client, &config)
}
