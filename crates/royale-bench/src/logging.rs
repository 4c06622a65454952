use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Keeps the non-blocking writer flushing until the run ends.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
    /// False when another subscriber was already installed; events then go
    /// to that subscriber and the telemetry file stays empty.
    pub installed: bool,
}

/// Telemetry lives beside the run's summary report, named after the run so
/// several runs can share an output directory.
pub fn telemetry_path(run_id: &str, outputs: &ResolvedOutputs) -> PathBuf {
    let dir = outputs
        .summary_md
        .parent()
        .map(Path::to_path_buf)
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(format!("{run_id}.telemetry.jsonl"))
}

/// Installs the global subscriber for an advisor run. Structured logging
/// writes JSON lines to [`telemetry_path`]; otherwise plain text goes to
/// stderr. `RUST_LOG` overrides the configured level.
pub fn init_logging(
    run_id: &str,
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if !logging.enable_structured {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        install(subscriber, run_id);
        return Ok(None);
    }

    let telemetry_path = telemetry_path(run_id, outputs);
    if let Some(dir) = telemetry_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();
    let installed = install(subscriber, run_id);

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
        installed,
    }))
}

fn install<S>(subscriber: S, run_id: &str) -> bool
where
    S: Subscriber + Send + Sync + 'static,
{
    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                run_id,
                error = %err,
                "tracing subscriber already initialised; keeping the existing one"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(summary: &str) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: PathBuf::from("decks.jsonl"),
            summary_md: PathBuf::from(summary),
        }
    }

    #[test]
    fn telemetry_is_named_after_the_run() {
        assert_eq!(
            telemetry_path("ladder", &outputs("out/ladder/summary.md")),
            PathBuf::from("out/ladder/ladder.telemetry.jsonl")
        );
        assert_eq!(
            telemetry_path("bare", &outputs("summary.md")),
            PathBuf::from("./bare.telemetry.jsonl")
        );
    }

    #[test]
    fn second_install_is_reported_not_fatal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let outputs = ResolvedOutputs {
            jsonl: dir.path().join("decks.jsonl"),
            summary_md: dir.path().join("summary.md"),
        };
        let logging = LoggingConfig {
            enable_structured: true,
            tracing_level: "debug".to_string(),
        };

        let first = init_logging("first", &logging, &outputs)
            .expect("first init")
            .expect("structured guard");
        let second = init_logging("second", &logging, &outputs)
            .expect("second init")
            .expect("structured guard");

        assert!(first.telemetry_path.exists());
        assert!(second.telemetry_path.exists());
        assert!(!second.installed);
    }
}
