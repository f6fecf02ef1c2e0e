mod config;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use extract::{ExtractionService, FieldSet, Upload};
use ingest::{ContentType, DOCX_MIME, FileReader, RawDocument};
use serde::Serialize;
use std::io::Cursor;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use config::{AppConfig, ExtractionMode, LoggingConfig};
use metrics::{Metrics, TimedOperation};

#[derive(Parser)]
#[command(name = "field-extract", about = "Extract dynamic fields from contract documents")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `mode` from the config file
    #[arg(long, value_enum)]
    mode: Option<ExtractionMode>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// .docx/.txt/.md files or directories containing them
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(Serialize)]
struct FileReport {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<FieldSet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
}

#[derive(Serialize)]
struct ErrorReport {
    status: u16,
    message: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(2);
        }
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    init_tracing(&config.logging);

    // The tagger is loaded once; without it there is no extraction at all.
    let service = match ExtractionService::load(&config.extraction) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!(model = %e.model, reason = %e.reason, hint = %e.hint, "Entity tagger unavailable");
            return ExitCode::from(3);
        }
    };

    match run(&cli, &config, service).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Run failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Extract every document and print one JSON report. Returns whether every
/// file succeeded.
async fn run(cli: &Cli, config: &AppConfig, service: Arc<ExtractionService>) -> Result<bool> {
    let mut documents = Vec::new();
    for path in &cli.paths {
        if path.is_dir() {
            documents.extend(FileReader::read_directory(path).await?);
        } else {
            documents.push(FileReader::read_file(path).await?);
        }
    }
    tracing::info!(documents = documents.len(), mode = ?config.mode, "Starting extraction run");

    let metrics = Metrics::new();
    let permits = Arc::new(Semaphore::new(config.concurrency.max_concurrent_extractions));
    let timeout = Duration::from_secs(config.concurrency.request_timeout_secs);

    let mut handles = Vec::with_capacity(documents.len());
    for document in documents {
        let service = service.clone();
        let metrics = metrics.clone();
        let permits = permits.clone();
        let mode = config.mode;

        handles.push(tokio::spawn(async move {
            let permit = permits.acquire_owned().await?;
            Ok::<_, anyhow::Error>(
                extract_document(service, metrics, document, mode, timeout, permit).await,
            )
        }));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await.context("extraction task failed")??);
    }

    let all_ok = reports.iter().all(|r| r.error.is_none());

    let json = if cli.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{}", json);

    tracing::info!(metrics = ?metrics.snapshot(), "Extraction run complete");
    Ok(all_ok)
}

/// Extraction is synchronous and CPU-bound, so it runs on the blocking pool
/// under a per-file timeout. The permit stays with the blocking work, so a
/// timed-out extraction still counts against the limit until it finishes.
async fn extract_document(
    service: Arc<ExtractionService>,
    metrics: Arc<Metrics>,
    document: RawDocument,
    mode: ExtractionMode,
    timeout: Duration,
    permit: OwnedSemaphorePermit,
) -> FileReport {
    let file = document.filename.clone();
    let timer = TimedOperation::start();

    let declared = match document.content_type {
        ContentType::Docx => DOCX_MIME,
        ContentType::PlainText => "text/plain",
    };
    let mut upload = Upload::new(
        document.filename,
        Some(declared.to_string()),
        Cursor::new(document.bytes),
    );

    let task = spawn_permitted(permit, move || {
        mode.strategies()
            .into_iter()
            .map(|kind| service.extract(kind, &mut upload))
            .collect::<Result<Vec<_>, _>>()
    });

    let outcome = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(results))) => {
            let fields = results.iter().map(FieldSet::len).sum();
            let skipped = results.iter().map(FieldSet::skipped).sum();
            metrics.record_success(timer.elapsed(), fields, skipped);
            Ok(results)
        }
        Ok(Ok(Err(e))) => {
            metrics.record_failure(e.is_client_error());
            Err(ErrorReport {
                status: e.status_code(),
                message: e.to_string(),
            })
        }
        Ok(Err(join_error)) => {
            tracing::error!(file = %file, error = %join_error, "Extraction worker failed");
            metrics.record_failure(false);
            Err(ErrorReport {
                status: 500,
                message: "failed to extract fields: worker failed".to_string(),
            })
        }
        Err(_) => {
            tracing::warn!(file = %file, timeout_secs = timeout.as_secs(), "Extraction timed out");
            metrics.record_failure(false);
            Err(ErrorReport {
                status: 504,
                message: format!("extraction timed out after {}s", timeout.as_secs()),
            })
        }
    };

    match outcome {
        Ok(results) => FileReport {
            file,
            results: Some(results),
            error: None,
        },
        Err(error) => FileReport {
            file,
            results: None,
            error: Some(error),
        },
    }
}

/// Run `work` on the blocking pool, releasing `permit` only when it returns.
fn spawn_permitted<T, F>(permit: OwnedSemaphorePermit, work: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[tokio::test]
    async fn test_timed_out_work_keeps_its_permit() {
        let permits = Arc::new(Semaphore::new(1));
        let permit = permits.clone().acquire_owned().await.unwrap();
        let (release, wait) = mpsc::channel::<()>();

        let task = spawn_permitted(permit, move || {
            let _ = wait.recv();
        });
        let waited = tokio::time::timeout(Duration::from_millis(20), task).await;
        assert!(waited.is_err());

        // Still running in the background, so the slot is still taken.
        assert_eq!(permits.available_permits(), 0);

        release.send(()).unwrap();
        let reacquired = tokio::time::timeout(Duration::from_secs(5), permits.acquire()).await;
        assert!(reacquired.is_ok());
    }

    #[test]
    fn test_cli_parses_mode_and_paths() {
        let cli = Cli::try_parse_from(["field-extract", "--mode", "all", "a.docx", "dir"]).unwrap();
        assert_eq!(cli.mode, Some(ExtractionMode::All));
        assert_eq!(cli.paths.len(), 2);
        assert!(!cli.pretty);
    }
}
