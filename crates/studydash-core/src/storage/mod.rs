mod config;
pub mod keys;
mod local;
mod sqlite;

pub use config::{
    AiLimitsConfig, Config, EconomyConfig, FirstDayBonusConfig, GoalConfig, RewardsConfig,
    SessionConfig,
};
pub use local::{LocalCache, LocalStore, MemoryStore};
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory.
///
/// `STUDYDASH_DATA_DIR` wins when set. Otherwise `~/.config/studydash`, or
/// `~/.config/studydash-dev` when `STUDYDASH_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STUDYDASH_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYDASH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studydash-dev")
            } else {
                base_dir.join("studydash")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
