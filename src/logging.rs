// 📝 Logging setup for the binaries
//
// The library only emits tracing events; binaries pick where they go.
// The terminal browser owns the screen, so it logs to a file.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(config: &AppConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(true);

    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(filter = %config.log_filter, "tracing initialized");
    }
    Ok(())
}

/// Log file used by the terminal browser when none is configured
pub fn default_ui_log_file() -> std::path::PathBuf {
    std::env::temp_dir().join("coa.log")
}
