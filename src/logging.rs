//! Tracing subscriber setup.

use std::io;

use helmsman_config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const FALLBACK_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to create log file appender: {0}")]
    Appender(#[from] rolling::InitError),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber: a console layer (text or JSON) plus a
/// daily-rotated file layer when `config.directory` is set.
///
/// `RUST_LOG` overrides `config.level`. Keep the returned guard alive for
/// the life of the process or buffered file output is lost.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(match config.format {
        LogFormat::Text => fmt::layer().with_target(true).with_ansi(true).boxed(),
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
    });

    let guard = match file_appender(config)? {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(fmt::layer().with_writer(writer).with_ansi(false).boxed());
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter(config))
        .try_init()?;

    Ok(guard)
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let level = match config.level.trim() {
        "" => FALLBACK_LEVEL,
        level => level,
    };
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

fn file_appender(config: &LoggingConfig) -> Result<Option<RollingFileAppender>, LoggingError> {
    let Some(dir) = config.log_dir() else {
        return Ok(None);
    };
    std::fs::create_dir_all(&dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.file_prefix.as_str())
        .filename_suffix("log")
        .max_log_files(config.max_files)
        .build(&dir)?;
    Ok(Some(appender))
}
