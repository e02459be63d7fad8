// ⚙️ Runtime configuration for the binaries
//
// Read from the environment:
// - COA_SEED      path to a JSON seed file (built-in chart when unset)
// - COA_ADDR      API server bind address
// - COA_LOG       tracing filter, falls back to RUST_LOG, then "info"
// - COA_LOG_FILE  write logs to this file instead of stderr

use crate::chart::ChartOfAccounts;
use crate::seed::SeedChart;
use anyhow::Result;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub seed_path: Option<PathBuf>,
    pub bind_addr: String,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            seed_path: None,
            bind_addr: DEFAULT_ADDR.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = AppConfig::default();

        AppConfig {
            seed_path: get("COA_SEED").map(PathBuf::from),
            bind_addr: get("COA_ADDR").unwrap_or(defaults.bind_addr),
            log_filter: get("COA_LOG")
                .or_else(|| get("RUST_LOG"))
                .unwrap_or(defaults.log_filter),
            log_file: get("COA_LOG_FILE").map(PathBuf::from),
        }
    }

    /// Load the chart from the configured seed, or the built-in one
    pub fn load_chart(&self) -> Result<ChartOfAccounts> {
        match &self.seed_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading chart seed");
                ChartOfAccounts::from_seed(SeedChart::from_path(path)?)
            }
            None => ChartOfAccounts::with_defaults(),
        }
    }
}
