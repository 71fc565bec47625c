//! TOML-based application configuration.
//!
//! Stores tunables including:
//! - Daily reward amounts per subscription level
//! - Session tick interval
//! - First-day bonus rules
//! - Credit costs and AI note quotas
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::goal::DailyGoal;
use crate::profile::{SubscriptionLevel, SubscriptionTier};

/// Daily reward amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// Credits for users without an active paid level.
    #[serde(default = "default_base_reward")]
    pub base: u64,
    #[serde(default = "default_basic_reward")]
    pub basic: u64,
    #[serde(default = "default_ultra_reward")]
    pub ultra: u64,
}

/// Periodic persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

/// One-time bonus for studying on the day an account is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstDayBonusConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_account_age_hours")]
    pub max_account_age_hours: i64,
    #[serde(default = "default_required_seconds")]
    pub required_seconds: u64,
    #[serde(default = "default_grant_minutes")]
    pub grant_minutes: i64,
    #[serde(default = "default_grant_tier")]
    pub tier: SubscriptionTier,
    #[serde(default = "default_grant_level")]
    pub level: SubscriptionLevel,
}

/// Credit costs of paid actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    #[serde(default = "default_cost")]
    pub profile_edit_cost: u64,
    #[serde(default = "default_cost")]
    pub name_change_cost: u64,
}

/// Daily AI note generations per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiLimitsConfig {
    #[serde(default)]
    pub free: u32,
    #[serde(default = "default_ai_basic")]
    pub basic: u32,
    #[serde(default = "default_ai_ultra")]
    pub ultra: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    #[serde(default = "default_goal_hours")]
    pub default_hours: u64,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub first_day_bonus: FirstDayBonusConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub ai_limits: AiLimitsConfig,
    #[serde(default)]
    pub goal: GoalConfig,
}

fn default_base_reward() -> u64 {
    3
}
fn default_basic_reward() -> u64 {
    10
}
fn default_ultra_reward() -> u64 {
    20
}
fn default_tick_interval_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_max_account_age_hours() -> i64 {
    24
}
fn default_required_seconds() -> u64 {
    3600
}
fn default_grant_minutes() -> i64 {
    60
}
fn default_grant_tier() -> SubscriptionTier {
    SubscriptionTier::Monthly
}
fn default_grant_level() -> SubscriptionLevel {
    SubscriptionLevel::Ultra
}
fn default_cost() -> u64 {
    10
}
fn default_ai_basic() -> u32 {
    5
}
fn default_ai_ultra() -> u32 {
    20
}
fn default_goal_hours() -> u64 {
    3
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            base: default_base_reward(),
            basic: default_basic_reward(),
            ultra: default_ultra_reward(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

impl Default for FirstDayBonusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_account_age_hours: default_max_account_age_hours(),
            required_seconds: default_required_seconds(),
            grant_minutes: default_grant_minutes(),
            tier: default_grant_tier(),
            level: default_grant_level(),
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            profile_edit_cost: default_cost(),
            name_change_cost: default_cost(),
        }
    }
}

impl Default for AiLimitsConfig {
    fn default() -> Self {
        Self {
            free: 0,
            basic: default_ai_basic(),
            ultra: default_ai_ultra(),
        }
    }
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            default_hours: default_goal_hours(),
        }
    }
}

pub const MAX_TICK_INTERVAL_SECS: u64 = 24 * 3600;
pub const MAX_ACCOUNT_AGE_HOURS: i64 = 366 * 24;
pub const MAX_GRANT_MINUTES: i64 = 366 * 24 * 60;

impl SessionConfig {
    /// Tick period, kept within 1 s and one day.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_interval_secs.clamp(1, MAX_TICK_INTERVAL_SECS))
    }
}

impl FirstDayBonusConfig {
    /// `None` when the configured hours do not fit a duration.
    pub fn max_account_age(&self) -> Option<Duration> {
        Duration::try_hours(self.max_account_age_hours)
    }

    /// `None` when the configured minutes do not fit a duration.
    pub fn grant_duration(&self) -> Option<Duration> {
        Duration::try_minutes(self.grant_minutes)
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Reject values the runtime cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn out_of_range<T: std::fmt::Display>(key: &str, value: T, min: T, max: T) -> ConfigError {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{value} is outside {min}..={max}"),
            }
        }

        let tick = self.session.tick_interval_secs;
        if !(1..=MAX_TICK_INTERVAL_SECS).contains(&tick) {
            return Err(out_of_range("session.tick_interval_secs", tick, 1, MAX_TICK_INTERVAL_SECS));
        }
        let age = self.first_day_bonus.max_account_age_hours;
        if !(0..=MAX_ACCOUNT_AGE_HOURS).contains(&age) {
            return Err(out_of_range("first_day_bonus.max_account_age_hours", age, 0, MAX_ACCOUNT_AGE_HOURS));
        }
        let grant = self.first_day_bonus.grant_minutes;
        if !(1..=MAX_GRANT_MINUTES).contains(&grant) {
            return Err(out_of_range("first_day_bonus.grant_minutes", grant, 1, MAX_GRANT_MINUTES));
        }
        DailyGoal::from_hours(self.goal.default_hours).map_err(|e| ConfigError::InvalidValue {
            key: "goal.default_hours".to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Path of the config file in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not fit the
    /// field, or the result fails [`Config::validate`]. `self` is left
    /// untouched on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let next: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
