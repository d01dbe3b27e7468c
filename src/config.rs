use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    BACKEND_URL_ENV, DEFAULT_BACKEND_URL, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_GESTURE_INTERVAL_MS,
    DEFAULT_LOG_FILE, DEFAULT_PREDICTIONS_LIMIT, DEFAULT_SETTLE_DELAY_MS,
    DEFAULT_STATISTICS_INTERVAL_MS,
};

const CONFIG_FILE: &str = "config.yaml";

/// Client settings, persisted as YAML under `~/.signdash`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend_url: String,
    pub frame_interval_ms: u64,
    pub gesture_interval_ms: u64,
    pub statistics_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub predictions_limit: u32,
    /// No timeout unless set; a hung request only costs a missed tick
    pub request_timeout_secs: Option<u64>,
    pub log_file: String,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            backend_url: String::from(DEFAULT_BACKEND_URL),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            gesture_interval_ms: DEFAULT_GESTURE_INTERVAL_MS,
            statistics_interval_ms: DEFAULT_STATISTICS_INTERVAL_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            predictions_limit: DEFAULT_PREDICTIONS_LIMIT,
            request_timeout_secs: None,
            log_file: String::from(DEFAULT_LOG_FILE),
            log_level: String::from("info"),
        }
    }
}

impl ClientConfig {
    /// Directory holding the config file
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".signdash")
    }

    /// Path of the config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    /// Load from the default location, then apply env and CLI overrides.
    /// Logging is not up yet when this runs, so a load failure is handed
    /// back for the caller to report.
    pub fn load(cli_backend: Option<String>) -> (Self, Option<anyhow::Error>) {
        Self::load_or_default(
            &Self::config_path(),
            std::env::var(BACKEND_URL_ENV).ok(),
            cli_backend,
        )
    }

    /// A missing file is created with the defaults, an unreadable one is
    /// left alone and replaced by defaults in memory
    pub fn load_or_default(
        path: &Path,
        env_backend: Option<String>,
        cli_backend: Option<String>,
    ) -> (Self, Option<anyhow::Error>) {
        let (mut config, error) = match Self::load_from(path) {
            Ok(Some(config)) => (config, None),
            Ok(None) => {
                let config = ClientConfig::default();
                let error = config
                    .save_to(path)
                    .with_context(|| format!("writing default config to {}", path.display()))
                    .err();
                (config, error)
            }
            Err(e) => (ClientConfig::default(), Some(e)),
        };
        config.apply_overrides(env_backend, cli_backend);
        (config, error)
    }

    /// Read a config file; `Ok(None)` when it does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_yaml::from_str::<ClientConfig>(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    /// Write the config, creating the parent directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Env var beats the file, CLI argument beats both
    pub fn apply_overrides(&mut self, env_backend: Option<String>, cli_backend: Option<String>) {
        for url in [env_backend, cli_backend].into_iter().flatten() {
            let url = url.trim();
            if !url.is_empty() {
                self.backend_url = url.to_string();
            }
        }
        self.backend_url = self.backend_url.trim_end_matches('/').to_string();
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn gesture_interval(&self) -> Duration {
        Duration::from_millis(self.gesture_interval_ms.max(1))
    }

    pub fn statistics_interval(&self) -> Duration {
        Duration::from_millis(self.statistics_interval_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
