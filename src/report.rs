//! Failure reporting for data-access operations.
//!
//! Catalog lookups never surface store failures to the interactive layer.
//! Instead every absorbed error goes through an [`ErrorChannel`], which prints
//! one human-readable line to stderr and emits one structured `tracing` event.
//! [`init_logging`] routes those events to a JSON-lines error log on disk.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{AppConfig, LoggingConfig};

/// Sink for errors that are absorbed instead of propagated.
#[derive(Debug, Default)]
pub struct ErrorChannel {
    failures: AtomicUsize,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed `operation`.
    pub fn record(&self, operation: &str, err: &anyhow::Error) {
        eprintln!("Error: {} failed: {:#}", operation, err);
        tracing::error!(operation, error = %format!("{:#}", err), "data access failed");
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Unwrap `result`, recording the error and falling back to the type's
    /// empty value on failure.
    pub fn absorb<T: Default>(&self, operation: &str, result: Result<T>) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                self.record(operation, &e);
                T::default()
            }
        }
    }

    /// Number of failures recorded so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Install the global tracing subscriber.
///
/// Error events are always appended to `logging.error_log` as JSON lines.
/// A human-readable stderr layer is added when debug mode is on or
/// `RUST_LOG` is set.
pub fn init_logging(logging: &LoggingConfig, app: &AppConfig) -> Result<()> {
    if let Some(parent) = logging.error_log.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory: {}", parent.display())
            })?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.error_log)
        .with_context(|| {
            format!("Failed to open error log: {}", logging.error_log.display())
        })?;

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .with_filter(LevelFilter::ERROR);

    let stderr_layer = if app.debug || std::env::var_os("RUST_LOG").is_some() {
        let default_level = if app.debug { "debug" } else { "warn" };
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
