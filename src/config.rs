//! Configuration types for the reminder daemon.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VigilConfig {
    /// Scheduler cadence settings.
    pub scheduler: SchedulerConfig,
    /// GitHub probe settings.
    pub github: GithubConfig,
    /// LeetCode probe settings.
    pub leetcode: LeetCodeConfig,
    /// Trigger/notification store settings.
    pub store: StoreConfig,
}

/// Scheduler cadence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between due-trigger checks.
    ///
    /// Triggers fire on wall-clock minute boundaries; the check interval
    /// must stay below 60 s so a minute boundary cannot be skipped under
    /// timer drift.
    pub check_interval_secs: u64,
    /// Ceiling for a single probe call, in seconds.
    pub probe_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            probe_timeout_secs: 30,
        }
    }
}

/// GitHub probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Personal access token. Unauthenticated requests work but hit the
    /// rate limit quickly.
    pub token: Option<String>,
    /// API base URL.
    pub base_url: String,
    /// Default username for the one-shot check mode.
    pub username: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: "https://api.github.com".to_owned(),
            username: None,
        }
    }
}

impl GithubConfig {
    /// Set the access token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the base URL (useful for testing with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// LeetCode probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeetCodeConfig {
    /// Site base URL.
    pub base_url: String,
}

impl Default for LeetCodeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://leetcode.com".to_owned(),
        }
    }
}

impl LeetCodeConfig {
    /// Set the base URL (useful for testing with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// State file path. `None` uses the platform default.
    pub state_path: Option<PathBuf>,
    /// Max notification records kept in the ledger.
    pub history_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_path: None,
            history_limit: 400,
        }
    }
}

impl VigilConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::VigilError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot
    /// be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VigilError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/vigil/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("vigil").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("vigil")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/vigil-config/config.toml")
        }
    }
}
