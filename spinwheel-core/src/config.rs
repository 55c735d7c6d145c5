// src/config.rs

use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Error;

const ENV_COOLDOWN_SECONDS: &str = "SPINWHEEL_COOLDOWN_SECONDS";
const ENV_SPIN_DURATION_MS: &str = "SPINWHEEL_SPIN_DURATION_MS";
const ENV_FULL_TURNS: &str = "SPINWHEEL_FULL_TURNS";
const ENV_DATABASE_URL: &str = "SPINWHEEL_DATABASE_URL";

/// Largest cooldown chrono can represent.
const MAX_COOLDOWN_SECONDS: i64 = i64::MAX / 1000;

/// Tunables for the wheel. Every field has a default so partial files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelConfig {
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: i64,
    #[serde(default = "default_spin_duration_ms")]
    pub spin_duration_ms: u64,
    /// Whole turns added to every spin for the animation. Never affects the result.
    #[serde(default = "default_full_turns")]
    pub full_turns: u32,
    /// SQLite path for draw records. `None` keeps records in memory only.
    #[serde(default)]
    pub database_url: Option<String>,
}

fn default_cooldown_seconds() -> i64 {
    24 * 60 * 60
}

fn default_spin_duration_ms() -> u64 {
    2000
}

fn default_full_turns() -> u32 {
    5
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: default_cooldown_seconds(),
            spin_duration_ms: default_spin_duration_ms(),
            full_turns: default_full_turns(),
            database_url: None,
        }
    }
}

impl WheelConfig {
    /// Defaults, then the optional JSON file, then environment (including `.env`).
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut config = match path {
            Some(p) => {
                info!("Loading wheel config from {}", p.display());
                let raw = std::fs::read_to_string(p)?;
                serde_json::from_str::<WheelConfig>(&raw)?
            }
            None => WheelConfig::default(),
        };

        dotenv::dotenv().ok();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_COOLDOWN_SECONDS) {
            self.cooldown_seconds = parse_var(ENV_COOLDOWN_SECONDS, &v)?;
        }
        if let Some(v) = lookup(ENV_SPIN_DURATION_MS) {
            self.spin_duration_ms = parse_var(ENV_SPIN_DURATION_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_FULL_TURNS) {
            self.full_turns = parse_var(ENV_FULL_TURNS, &v)?;
        }
        if let Some(v) = lookup(ENV_DATABASE_URL) {
            let v = v.trim();
            self.database_url = if v.is_empty() { None } else { Some(v.to_string()) };
        }
        debug!("Effective wheel config: {:?}", self);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.cooldown_seconds <= 0 || Duration::try_seconds(self.cooldown_seconds).is_none() {
            return Err(Error::Config(format!(
                "cooldown_seconds must be positive and at most {}, got {}",
                MAX_COOLDOWN_SECONDS, self.cooldown_seconds
            )));
        }
        if self.spin_duration_ms == 0 {
            return Err(Error::Config("spin_duration_ms must be non-zero".into()));
        }
        if self.full_turns == 0 {
            return Err(Error::Config("full_turns must be at least 1".into()));
        }
        Ok(())
    }

    /// Saturates instead of panicking on values `validate` would reject.
    pub fn cooldown(&self) -> Duration {
        Duration::try_seconds(self.cooldown_seconds).unwrap_or(Duration::MAX)
    }

    pub fn spin_duration(&self) -> StdDuration {
        StdDuration::from_millis(self.spin_duration_ms)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| Error::Config(format!("{key} has invalid value '{value}'")))
}
