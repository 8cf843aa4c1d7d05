use anyhow::{Context, Result};
use std::fs;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const LOG_FILE_PREFIX: &str = "account-ledger.log";

/// Configuration for console and file logging
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub enable_console: bool,
    pub enable_file: bool,
    pub log_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            enable_console: true,
            enable_file: false,
            log_level: Level::INFO,
        }
    }
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(level: Level) -> String {
    format!(
        "{crate_name}={level},tower_http={level},sqlx=warn",
        crate_name = env!("CARGO_PKG_NAME").replace('-', "_"),
        level = level
    )
}

/// Installs the global subscriber. The returned guards flush the file writer
/// on drop, so keep them alive until shutdown.
pub fn init_logging(config: LoggingConfig) -> Result<Vec<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config.log_level)));

    let mut layers: Vec<Box<dyn Layer<_> + Send + Sync>> = Vec::new();
    let mut guards = Vec::new();

    if config.enable_console {
        let console_layer = fmt::layer()
            .with_target(false)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true);
        layers.push(Box::new(console_layer));
    }

    if config.enable_file {
        fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("creating log directory {}", config.log_dir))?;

        let appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);
        layers.push(Box::new(file_layer));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guards)
}
