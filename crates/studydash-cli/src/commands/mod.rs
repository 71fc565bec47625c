pub mod activity;
pub mod config;
pub mod goal;
pub mod inbox;
pub mod profile;
pub mod reward;
pub mod session;

use std::sync::Arc;

use studydash_core::goal::{load_goal, DailyGoal, DEFAULT_GOAL};
use studydash_core::{Config, LocalCache, SqliteStore, UserProfile};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Local cache backed by the SQLite store in the data directory.
pub fn open_cache() -> Result<LocalCache, Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    Ok(LocalCache::new(Arc::new(store)))
}

pub async fn current_profile(cache: &LocalCache) -> Result<UserProfile, Box<dyn std::error::Error>> {
    cache
        .current_user()
        .await?
        .ok_or_else(|| "no profile on this device; run `studydash profile init` first".into())
}

/// The user's goal, falling back to the configured default, then to three hours.
pub async fn current_goal(cache: &LocalCache, config: &Config, user_id: &str) -> Result<DailyGoal, Box<dyn std::error::Error>> {
    let default = DailyGoal::from_hours(config.goal.default_hours).unwrap_or(DEFAULT_GOAL);
    Ok(load_goal(cache, user_id, default).await?)
}
