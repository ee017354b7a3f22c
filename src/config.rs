use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::trend::TrendConfig;

pub const POLL_INTERVAL_ENV: &str = "AQI_SYNC_POLL_SECS";
pub const DEBUG_ENV: &str = "AQI_SYNC_DEBUG";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub poll_interval_secs: u64,
    /// SQLite file backing the cache store; `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,
    pub trend: TrendConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            database_path: None,
            trend: TrendConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read `path` if it exists, then apply environment overrides.
    ///
    /// A missing file means defaults; a malformed one is logged and also means
    /// defaults. Only an unreadable file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed config {}: {err}", path.display());
                EngineConfig::default()
            })
        } else {
            EngineConfig::default()
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(POLL_INTERVAL_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.poll_interval_secs = secs,
                _ => warn!("Ignoring invalid {POLL_INTERVAL_ENV}={raw}"),
            }
        }
        self
    }

    pub fn persist(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

/// `AQI_SYNC_DEBUG=1` or `true` turns on debug logging.
pub fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
