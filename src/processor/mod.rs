//! Batch lookup engine.
//!
//! Normalizes and deduplicates the input identifiers, resolves the valid
//! ones against the registry with bounded concurrency and assembles one
//! report row per unique identifier, in first-seen order.

pub mod writer;

#[cfg(test)]
pub mod tests;

use crate::config::LookupConfig;
use crate::constants::MAX_CONCURRENCY;
use crate::error::{LookupError, Result};
use crate::identifier::{Cnpj, NormalizeError, deduplicate, normalize};
use crate::input::{InputSchema, read_identifiers};
use crate::models::{BatchReport, FailureKind, InputIdentifier, LookupResult, ProcessingStats};
use crate::registry::{RegistryClient, RegistryTransport};
use crate::shaper::shape;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One unique identifier on its way through the pipeline
#[derive(Debug)]
struct Entry {
    /// Spreadsheet row of the first occurrence
    row: usize,
    /// Report identifier and deduplication key
    key: String,
    outcome: std::result::Result<Cnpj, NormalizeError>,
}

impl Entry {
    fn new(input: InputIdentifier) -> Self {
        let outcome = normalize(&input.raw);
        let key = match &outcome {
            Ok(cnpj) => cnpj.to_string(),
            Err(NormalizeError::InvalidChecksum { cnpj }) => cnpj.clone(),
            Err(NormalizeError::InvalidFormat { .. }) => input.raw.trim().to_string(),
        };

        Self {
            row: input.row,
            key,
            outcome,
        }
    }
}

/// Drives registry lookups for a batch of identifiers
pub struct BatchProcessor {
    client: Arc<RegistryClient>,
    concurrency: usize,
    progress: bool,
}

impl BatchProcessor {
    pub fn new(client: RegistryClient, config: &LookupConfig) -> Self {
        Self {
            client: Arc::new(client),
            concurrency: config.concurrency.clamp(1, MAX_CONCURRENCY),
            progress: config.progress,
        }
    }

    /// Resolve every identifier and build the ordered report
    ///
    /// Per-identifier problems end up in the report rows. When `cancel`
    /// fires, in-flight lookups are dropped and every identifier without a
    /// result is reported as `Incomplete`.
    pub async fn process(
        &self,
        identifiers: Vec<InputIdentifier>,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let start_time = Instant::now();
        let mut stats = ProcessingStats {
            rows_read: identifiers.len(),
            ..ProcessingStats::default()
        };

        let entries: Vec<Entry> = identifiers.into_iter().map(Entry::new).collect();
        let (entries, duplicates) = deduplicate(entries, |entry| entry.key.clone());
        if duplicates > 0 {
            info!("Removed {} duplicate identifier(s)", duplicates);
        }
        stats.unique_identifiers = entries.len();
        stats.duplicates_removed = duplicates;

        // Position-tagged result slots; invalid identifiers are settled up front
        let mut slots: Vec<Option<LookupResult>> = Vec::with_capacity(entries.len());
        let mut pending = Vec::new();
        for (position, entry) in entries.iter().enumerate() {
            match &entry.outcome {
                Ok(cnpj) => {
                    slots.push(None);
                    pending.push((position, cnpj.clone()));
                }
                Err(e) => {
                    warn!("Row {}: '{}' is invalid: {}", entry.row, entry.key, e);
                    slots.push(Some(LookupResult::failure(
                        e.kind(),
                        entry.key.as_str(),
                        e.to_string(),
                    )));
                }
            }
        }

        info!(
            "Looking up {} identifier(s) with concurrency {}",
            pending.len(),
            self.concurrency
        );

        let progress_bar = self.progress_bar(entries.len());
        progress_bar.inc((entries.len() - pending.len()) as u64);

        let client = &self.client;
        let mut lookups = std::pin::pin!(
            stream::iter(pending)
                .map(|(position, cnpj)| async move {
                    let result = client.lookup(&cnpj).await;
                    (position, result)
                })
                .buffer_unordered(self.concurrency)
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Lookup cancelled, remaining identifiers are marked incomplete");
                    stats.interrupted = true;
                    break;
                }
                next = lookups.next() => match next {
                    Some((position, result)) => {
                        debug!("Finished position {}: {:?}", position, result.failure_kind());
                        progress_bar.set_message(result.identifier().to_string());
                        slots[position] = Some(result);
                        progress_bar.inc(1);
                    }
                    None => break,
                }
            }
        }

        if stats.interrupted {
            progress_bar.abandon_with_message("interrupted");
        } else {
            progress_bar.finish_with_message("done");
        }

        let rows = entries
            .iter()
            .zip(slots)
            .map(|(entry, slot)| {
                let result = slot.unwrap_or_else(|| {
                    LookupResult::failure(
                        FailureKind::Incomplete,
                        entry.key.as_str(),
                        "run interrupted before the lookup finished",
                    )
                });
                stats.record(result.failure_kind());
                shape(&result)
            })
            .collect();

        stats.elapsed = start_time.elapsed();
        info!(
            "Batch finished: {} succeeded, {} failed in {:.2?}",
            stats.succeeded,
            stats.failed(),
            stats.elapsed
        );

        BatchReport { rows, stats }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        ) {
            progress_bar.set_style(style.progress_chars("#>-"));
        }
        progress_bar
    }
}

/// Load the input, resolve it and write the report
///
/// The report is written even when `cancel` fires mid-batch; only a
/// cancellation before any identifier was loaded returns `Interrupted`.
pub async fn run_lookup(
    config: &LookupConfig,
    transport: Arc<dyn RegistryTransport>,
    cancel: &CancellationToken,
) -> Result<BatchReport> {
    config.validate()?;

    let schema = InputSchema {
        column: &config.column,
        sheet: config.sheet.as_deref(),
    };
    let table = read_identifiers(&config.input, &schema)?;

    if cancel.is_cancelled() {
        return Err(LookupError::Interrupted {
            reason: "cancelled before lookups started".to_string(),
        });
    }

    let client = RegistryClient::new(transport, config.backoff.clone(), config.min_interval);
    let processor = BatchProcessor::new(client, config);

    let mut report = processor.process(table.identifiers, cancel).await;
    report.stats.blank_rows_skipped = table.blank_rows_skipped;

    writer::write_report(&config.output, &report.rows)?;
    report.stats.output_path = Some(config.output.clone());
    info!("Report written to {}", config.output.display());

    Ok(report)
}
