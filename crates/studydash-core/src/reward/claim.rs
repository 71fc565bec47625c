use chrono::{DateTime, Local, Utc};

use super::evaluator::can_claim;
use super::tiers::reward_amount;
use crate::profile::UserProfile;
use crate::storage::RewardsConfig;

/// Result of a claim attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// Credits added; `profile` is the updated working copy.
    Claimed { amount: u64, profile: UserProfile },
    /// Not eligible. Nothing changed.
    Ignored,
}

/// Claim today's reward if eligible. An ineligible claim is silently ignored.
pub fn claim(
    profile: &UserProfile,
    accumulated_secs: u64,
    goal_secs: u64,
    rewards: &RewardsConfig,
    now: DateTime<Utc>,
) -> ClaimOutcome {
    let local_now: DateTime<Local> = now.with_timezone(&Local);
    if !can_claim(accumulated_secs, goal_secs, profile.last_reward_claim_date, local_now) {
        return ClaimOutcome::Ignored;
    }

    let amount = reward_amount(profile, rewards);
    let mut updated = profile.clone();
    updated.credits = updated.credits.saturating_add(amount);
    updated.last_reward_claim_date = Some(now);
    ClaimOutcome::Claimed {
        amount,
        profile: updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SubscriptionLevel;
    use chrono::Duration;

    #[test]
    fn claim_adds_tier_amount_once() {
        let now = Utc::now();
        let rewards = RewardsConfig::default();
        let mut profile = UserProfile::new("u1", "A", "a@x");
        profile.credits = 50;
        profile.is_premium = true;
        profile.subscription_level = Some(SubscriptionLevel::Basic);
        profile.last_reward_claim_date = Some(now - Duration::days(1));

        let ClaimOutcome::Claimed { amount, profile } = claim(&profile, 10800, 10800, &rewards, now)
        else {
            panic!("expected claim to succeed");
        };
        assert_eq!(amount, 10);
        assert_eq!(profile.credits, 60);
        assert_eq!(profile.last_reward_claim_date, Some(now));

        assert_eq!(
            claim(&profile, 10800, 10800, &rewards, now),
            ClaimOutcome::Ignored
        );
    }

    #[test]
    fn ineligible_claim_is_ignored() {
        let profile = UserProfile::new("u1", "A", "a@x");
        let outcome = claim(&profile, 100, 3600, &RewardsConfig::default(), Utc::now());
        assert_eq!(outcome, ClaimOutcome::Ignored);
    }
}
