//! Configuration loading from TOML with environment variable overrides.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! field has a default, so a missing file runs with the built-in schedule
//! and reward ranges. A file that exists but does not parse is fatal.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::types::{MajorError, RatingPolicy};

/// Env var overriding `agent.data_file`.
pub const DATA_FILE_ENV: &str = "MAJOR_DATA_FILE";

/// Env var overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "MAJOR_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub api: ApiConfig,
    pub rewards: RewardsConfig,
    pub pacing: PacingConfig,
    pub totals: TotalsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    /// Newline-delimited credentials, one account per line.
    pub data_file: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "MAJOR-BOT".to_string(),
            data_file: "data.txt".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://major.glados.app/api".to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Coin amounts submitted to the passive-coin and swipe-coin endpoints.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RewardsConfig {
    pub hold_coins_min: u32,
    pub hold_coins_max: u32,
    pub swipe_coins_min: u32,
    pub swipe_coins_max: u32,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            hold_coins_min: 900,
            hold_coins_max: 950,
            swipe_coins_min: 1000,
            swipe_coins_max: 1300,
        }
    }
}

impl RewardsConfig {
    pub fn hold_coins(&self) -> RangeInclusive<u32> {
        self.hold_coins_min..=self.hold_coins_max
    }

    pub fn swipe_coins(&self) -> RangeInclusive<u32> {
        self.swipe_coins_min..=self.swipe_coins_max
    }

    fn validate(&self) -> Result<(), MajorError> {
        if self.hold_coins().is_empty() {
            return Err(MajorError::Config(format!(
                "hold_coins_min ({}) exceeds hold_coins_max ({})",
                self.hold_coins_min, self.hold_coins_max
            )));
        }
        if self.swipe_coins().is_empty() {
            return Err(MajorError::Config(format!(
                "swipe_coins_min ({}) exceeds swipe_coins_max ({})",
                self.swipe_coins_min, self.swipe_coins_max
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause between task completion submissions.
    pub task_delay_ms: u64,
    /// Countdown between two accounts in the same pass.
    pub account_gap_secs: u64,
    /// Countdown after a pass before the next one starts.
    pub pass_interval_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            task_delay_ms: 1000,
            account_gap_secs: 3,
            pass_interval_secs: 28_850,
        }
    }
}

impl PacingConfig {
    pub fn task_delay(&self) -> Duration {
        Duration::from_millis(self.task_delay_ms)
    }

    pub fn account_gap(&self) -> Duration {
        Duration::from_secs(self.account_gap_secs)
    }

    pub fn pass_interval(&self) -> Duration {
        Duration::from_secs(self.pass_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TotalsConfig {
    pub rating_policy: RatingPolicy,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    /// `MAJOR_DATA_FILE` overrides the credentials path either way.
    pub fn load_or_default(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::load(path)?
        } else {
            info!(path, "No config file found, using defaults");
            Self::default()
        };

        if let Ok(data_file) = std::env::var(DATA_FILE_ENV) {
            config.agent.data_file = data_file;
        }

        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.rewards.validate()?;
        Ok(config)
    }
}
