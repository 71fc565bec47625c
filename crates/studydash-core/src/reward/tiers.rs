//! Reward amounts by subscription level.

use crate::profile::{SubscriptionLevel, UserProfile};
use crate::storage::RewardsConfig;

/// Daily reward for a user: a lookup, never a computation.
pub fn reward_amount(profile: &UserProfile, rewards: &RewardsConfig) -> u64 {
    match profile.effective_level() {
        Some(SubscriptionLevel::Ultra) => rewards.ultra,
        Some(SubscriptionLevel::Basic) => rewards.basic,
        None => rewards.base,
    }
}
