//! One-shot prompts: the referral invitation and the new-update alert.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::notice::Notice;
use crate::profile::UserProfile;
use crate::storage::keys::{LastReadUpdateKey, ReferralShownKey, UpdateAlertShownKey};
use crate::storage::LocalCache;

/// Accounts younger than this are offered the referral prompt.
pub const REFERRAL_WINDOW_MINUTES: i64 = 10;

/// Show the referral prompt at most once, to brand-new accounts that have not
/// redeemed a code. Returns true when the caller should show it.
pub async fn take_referral_prompt(cache: &LocalCache, profile: &UserProfile, now: DateTime<Utc>) -> Result<bool> {
    let is_new = profile
        .account_age(now)
        .is_some_and(|age| age < Duration::minutes(REFERRAL_WINDOW_MINUTES));
    if !is_new || profile.redeemed_referral_code.is_some() {
        return Ok(false);
    }
    let key = ReferralShownKey {
        user_id: &profile.id,
    };
    if cache.load(&key).await?.unwrap_or(false) {
        return Ok(false);
    }
    cache.save(&key, &true).await?;
    Ok(true)
}

/// Latest broadcast content update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAnnouncement {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateCheck {
    /// The update arrived after the user last opened the updates list.
    pub has_new: bool,
    /// Alert to show now. Each update is alerted once.
    pub alert: Option<Notice>,
}

pub async fn check_update(cache: &LocalCache, latest: &UpdateAnnouncement) -> Result<UpdateCheck> {
    let last_read = cache.load(&LastReadUpdateKey).await?;
    if last_read.is_some_and(|read| latest.timestamp <= read) {
        return Ok(UpdateCheck::default());
    }

    let key = UpdateAlertShownKey {
        update_id: &latest.id,
    };
    let alert = if cache.load(&key).await?.unwrap_or(false) {
        None
    } else {
        cache.save(&key, &true).await?;
        Some(Notice::info(format!("New Content Available: {}", latest.text)).titled("New Update"))
    };
    Ok(UpdateCheck { has_new: true, alert })
}

pub async fn mark_updates_read(cache: &LocalCache, now: DateTime<Utc>) -> Result<()> {
    cache.save(&LastReadUpdateKey, &now).await
}
