// Logging module - tracing subscriber setup
//
// Stdout always gets the human-readable fmt layer. When file logging is
// enabled a second, JSON-formatted layer writes through a non-blocking
// rolling appender. The returned guard must live until shutdown or
// buffered lines are lost.
//
// Precedence: RUST_LOG env var > [logging] level > "info"

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFile, LogRotation, LoggingConfig};

/// Filter used when RUST_LOG is unset
pub fn default_filter(level: &str) -> String {
    format!("nexcard={},tower_http=info,axum=info", level)
}

fn file_appender(file: &LogFile) -> RollingFileAppender {
    let dir = &file.dir;
    let prefix = &file.prefix;
    match file.rotation {
        LogRotation::Hourly => tracing_appender::rolling::hourly(dir, prefix),
        LogRotation::Daily => tracing_appender::rolling::daily(dir, prefix),
        LogRotation::Never => tracing_appender::rolling::never(dir, prefix),
    }
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)));

    let Some(file) = &config.file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to install tracing subscriber")?;
        return Ok(None);
    };

    if let Err(e) = std::fs::create_dir_all(&file.dir) {
        // Fall back to stdout only
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            file.dir, e
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to install tracing subscriber")?;
        return Ok(None);
    }

    // Writes happen on a background thread
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = default_filter("debug");
        assert_eq!(filter, "nexcard=debug,tower_http=info,axum=info");
        assert!(EnvFilter::try_new(filter).is_ok());
    }
}
