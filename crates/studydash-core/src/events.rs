use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notice::Notice;
use crate::profile::{SubscriptionLevel, SubscriptionTier};

/// Every state change a session makes produces an Event.
/// Front ends subscribe to them to refresh and to show notices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A remote snapshot diverged on a synchronized field and replaced the working copy.
    ProfileSynced {
        user_id: String,
        credits: u64,
        at: DateTime<Utc>,
    },
    RewardClaimed {
        user_id: String,
        amount: u64,
        credits: u64,
        at: DateTime<Utc>,
    },
    FirstDayBonusGranted {
        user_id: String,
        tier: SubscriptionTier,
        level: SubscriptionLevel,
        expires_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// One periodic tick finished. `local_ok`/`remote_ok` report the best-effort writes.
    TickPersisted {
        user_id: String,
        seconds_today: u64,
        local_ok: bool,
        remote_ok: bool,
        at: DateTime<Utc>,
    },
    InboxRead {
        user_id: String,
        at: DateTime<Utc>,
    },
    CreditsSpent {
        user_id: String,
        amount: u64,
        reason: String,
        at: DateTime<Utc>,
    },
    /// A message for the user.
    Notice {
        notice: Notice,
        at: DateTime<Utc>,
    },
}
