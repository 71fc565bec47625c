//! Daily study goal.
//!
//! The goal is stored per user in the local cache and only changes when the
//! user picks a new one.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::storage::keys::DailyGoalKey;
use crate::storage::LocalCache;

pub const MIN_GOAL_SECS: u64 = 60;
pub const MAX_GOAL_SECS: u64 = 12 * 3600;

/// Goal used when neither the user nor the config supplies a usable one.
pub const DEFAULT_GOAL: DailyGoal = DailyGoal::from_secs(3 * 3600);

/// Goal presets offered by the goal picker: label and seconds.
pub const GOAL_PRESETS: [(&str, u64); 4] = [
    ("30 min", 1800),
    ("1 hr", 3600),
    ("2 hr", 7200),
    ("3 hr", 10800),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyGoal {
    seconds: u64,
}

impl DailyGoal {
    /// Build a goal without range checks. Use [`DailyGoal::new`] for user input.
    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Validated goal for user input.
    pub fn new(seconds: u64) -> Result<Self, ValidationError> {
        if !(MIN_GOAL_SECS..=MAX_GOAL_SECS).contains(&seconds) {
            return Err(ValidationError::GoalOutOfRange {
                seconds,
                min: MIN_GOAL_SECS,
                max: MAX_GOAL_SECS,
            });
        }
        Ok(Self { seconds })
    }

    pub fn from_hours(hours: u64) -> Result<Self, ValidationError> {
        Self::new(hours.saturating_mul(3600))
    }

    /// Custom goal entered in minutes.
    pub fn from_minutes(minutes: u64) -> Result<Self, ValidationError> {
        Self::new(minutes.saturating_mul(60))
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }
}

/// Goal for `user_id`, or `default` when none has been picked or the cached
/// value is unusable.
pub async fn load_goal(cache: &LocalCache, user_id: &str, default: DailyGoal) -> Result<DailyGoal> {
    let stored = cache.load(&DailyGoalKey { user_id }).await?;
    Ok(stored
        .filter(|g| DailyGoal::new(g.seconds).is_ok())
        .unwrap_or(default))
}

pub async fn save_goal(cache: &LocalCache, user_id: &str, goal: DailyGoal) -> Result<()> {
    cache.save(&DailyGoalKey { user_id }, &goal).await
}
