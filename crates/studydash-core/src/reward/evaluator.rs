//! Daily reward eligibility.
//!
//! Eligibility is never stored. It is recomputed from the seconds studied
//! today, the daily goal and the date of the last claim whenever any of them
//! changes.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{local_day, local_day_of};

/// True when the goal is met and no claim was made on today's local calendar day.
pub fn can_claim(
    accumulated_secs: u64,
    goal_secs: u64,
    last_claim: Option<DateTime<Utc>>,
    now: DateTime<Local>,
) -> bool {
    accumulated_secs >= goal_secs && !claimed_on_day_of(last_claim, now)
}

/// Same as [`can_claim`] for a last-claim date given as an RFC 3339 string.
/// An unparsable date counts as no claim.
pub fn can_claim_iso(
    accumulated_secs: u64,
    goal_secs: u64,
    last_claim_iso: Option<&str>,
    now: DateTime<Local>,
) -> bool {
    let last_claim = last_claim_iso
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|ts| ts.with_timezone(&Utc));
    can_claim(accumulated_secs, goal_secs, last_claim, now)
}

fn claimed_on_day_of(last_claim: Option<DateTime<Utc>>, now: DateTime<Local>) -> bool {
    local_day_of(last_claim).is_some_and(|day| day == local_day(&now))
}

/// Snapshot of everything the reward card shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaimState {
    pub accumulated_secs: u64,
    pub goal_secs: u64,
    pub claimed_today: bool,
    pub eligible: bool,
}

impl RewardClaimState {
    pub fn evaluate(
        accumulated_secs: u64,
        goal_secs: u64,
        last_claim: Option<DateTime<Utc>>,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            accumulated_secs,
            goal_secs,
            claimed_today: claimed_on_day_of(last_claim, now),
            eligible: can_claim(accumulated_secs, goal_secs, last_claim, now),
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.goal_secs.saturating_sub(self.accumulated_secs)
    }
}
