//! Logging utilities for slotbook.
//!
//! All binaries initialise tracing through this module so every crate logs with
//! the same fields and filter rules.

use slotbook_config::LoggingConfig;
use std::str::FromStr;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` directives are honoured; the `slotbook` target is raised to `level`.
pub fn init_with_level(level: Level) {
    let result = tracing_subscriber::registry()
        .with(stdout_layer())
        .with(build_filter(level))
        .try_init();

    // try_init fails when a subscriber is already set (tests, embedding); that is fine
    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize logging from the `[logging]` config section.
///
/// When a directory is configured a daily rolling file is written as well. The
/// returned guard must be kept alive for the file writer to flush.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "slotbook.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(stdout_layer())
        .with(file_layer)
        .with(build_filter(level))
        .try_init();

    if result.is_ok() {
        info!(
            level = %level,
            directory = config.directory.as_deref().unwrap_or("-"),
            "Logging initialized"
        );
    }
    guard
}

fn stdout_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
}

fn build_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match format!("slotbook={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        init_with_level(Level::INFO);
        init_with_level(Level::DEBUG);
        assert!(init_from_config(&LoggingConfig::default()).is_none());
    }
}
