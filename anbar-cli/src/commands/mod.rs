//! CLI command implementations

pub mod add;
pub mod clear;
pub mod config;
pub mod count;
pub mod dedupe;
pub mod export;
pub mod import;
pub mod list;
pub mod logs;
pub mod remove;
pub mod status;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use anbar_core::config::default_data_dir;
use anbar_core::{AnbarContext, EntryPoint, LogEvent, LoggingService};
use indicatif::{ProgressBar, ProgressStyle};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    LoggingService::new(&get_data_dir(), EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> PathBuf {
    default_data_dir()
}

/// Load config and inventory state from the data directory
pub async fn get_context() -> Result<AnbarContext> {
    let data_dir = get_data_dir();

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
    tracing::debug!(data_dir = %data_dir.display(), "loading inventory");

    AnbarContext::new(&data_dir)
        .await
        .context("Failed to initialize inventory context")
}

/// Spinner on stderr for long-running file work; hidden when `quiet`
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
