//! Cancellation and structural failures

use super::{inputs, processor};
use crate::config::LookupConfig;
use crate::error::LookupError;
use crate::processor::run_lookup;
use crate::registry::tests::{ScriptedTransport, company_body};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

const A: &str = "11222333000181";
const B: &str = "00000000000191";
const C: &str = "33000167000101";

#[tokio::test(start_paused = true)]
async fn test_cancel_marks_pending_rows_incomplete() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .ok(A, &company_body(A, "EMPRESA A"))
            .status(B, 503),
    );
    let processor = processor(transport, 1);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let report = processor.process(inputs(&[A, B, "999", C]), &cancel).await;

    let errors: Vec<&str> = report.rows.iter().map(|r| r.error.as_str()).collect();
    assert_eq!(errors, vec!["", "Incomplete", "InvalidFormat", "Incomplete"]);
    assert_eq!(report.rows[1].identifier, B);
    assert!(report.stats.interrupted);
    assert_eq!(report.stats.incomplete, 2);
    assert_eq!(report.stats.succeeded, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_start_makes_no_calls() {
    let transport = Arc::new(ScriptedTransport::new().ok(A, &company_body(A, "EMPRESA A")));
    let processor = processor(transport.clone(), 2);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = processor.process(inputs(&[A, "abc"]), &cancel).await;

    assert_eq!(transport.calls(), 0);
    assert_eq!(report.rows[0].error, "Incomplete");
    assert_eq!(report.rows[1].error, "InvalidFormat");
}

#[tokio::test]
async fn test_run_lookup_missing_input() {
    let temp_dir = TempDir::new().unwrap();
    let config = LookupConfig::new(temp_dir.path().join("nao_existe.csv"))
        .with_output(temp_dir.path().join("out.csv"))
        .without_progress();

    let result = run_lookup(&config, Arc::new(ScriptedTransport::new()), &CancellationToken::new()).await;

    assert!(matches!(result, Err(LookupError::InputNotFound { .. })));
    assert!(!temp_dir.path().join("out.csv").exists());
}

#[tokio::test]
async fn test_run_lookup_missing_column_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("lista.csv");
    fs::write(&input, "Documento\n11222333000181\n").unwrap();
    let output = temp_dir.path().join("out.xlsx");

    let config = LookupConfig::new(&input)
        .with_output(&output)
        .without_progress();
    let result = run_lookup(&config, Arc::new(ScriptedTransport::new()), &CancellationToken::new()).await;

    match result {
        Err(LookupError::MissingColumn { column, .. }) => assert_eq!(column, "CNPJ"),
        other => panic!("Expected MissingColumn, got {other:?}"),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_run_lookup_rejects_invalid_config() {
    let config = LookupConfig::new("lista.csv").with_concurrency(9);

    let result = run_lookup(&config, Arc::new(ScriptedTransport::new()), &CancellationToken::new()).await;

    assert!(matches!(result, Err(LookupError::Configuration { .. })));
}

#[tokio::test]
async fn test_run_lookup_unsupported_output_makes_no_calls() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("lista.csv");
    fs::write(&input, "CNPJ\n11222333000181\n00000000000191\n").unwrap();
    let output = temp_dir.path().join("out.ods");

    let transport = Arc::new(ScriptedTransport::new().ok(A, &company_body(A, "EMPRESA A")));
    let config = LookupConfig::new(&input)
        .with_output(&output)
        .with_min_interval(Duration::ZERO)
        .without_progress();
    let result = run_lookup(&config, transport.clone(), &CancellationToken::new()).await;

    assert!(matches!(result, Err(LookupError::UnsupportedFormat { .. })));
    assert_eq!(transport.calls(), 0);
    assert!(!output.exists());
}

#[tokio::test(start_paused = true)]
async fn test_run_lookup_writes_csv_report() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("lista.csv");
    fs::write(&input, "Nome,CNPJ\nA,11.222.333/0001-81\nB,\nC,123\n").unwrap();
    let output = temp_dir.path().join("saida").join("resultado.csv");

    let transport = Arc::new(ScriptedTransport::new().ok(A, &company_body(A, "EMPRESA A")));
    let config = LookupConfig::new(&input)
        .with_output(&output)
        .with_min_interval(Duration::ZERO)
        .without_progress();

    let report = run_lookup(&config, transport, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.stats.blank_rows_skipped, 1);
    assert_eq!(report.stats.output_path.as_deref(), Some(output.as_path()));

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("11222333000181,EMPRESA A,"));
    assert!(lines[2].starts_with("123,"));
    assert!(lines[2].ends_with(",InvalidFormat"));
}
