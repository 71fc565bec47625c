//! Typed registry of local storage keys.
//!
//! Every value in the local store is addressed through one of the key types
//! below, which fixes both the key string and the value schema. Templates
//! carry distinct prefixes so two owners can never write the same key.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::calendar::day_key;
use crate::goal::DailyGoal;
use crate::profile::UserProfile;

/// A key in the local store together with the type stored under it.
pub trait StorageKey {
    type Value: Serialize + DeserializeOwned + Send + Sync;

    fn template(&self) -> KeyTemplate;

    /// Suffix appended to the template prefix. Empty for singleton keys.
    fn suffix(&self) -> String {
        String::new()
    }

    fn key(&self) -> String {
        let suffix = self.suffix();
        if suffix.is_empty() {
            self.template().prefix().to_string()
        } else {
            format!("{}:{}", self.template().prefix(), suffix)
        }
    }
}

/// All key templates known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTemplate {
    CurrentUser,
    Users,
    DailyGoal,
    DailyActivity,
    FirstDayBonus,
    ReferralShown,
    AiUsage,
    ChallengeStarted,
    LastReadUpdate,
    UpdateAlertShown,
    AudioGuideEnabled,
    PreferredVoice,
    VoiceScripts,
}

impl KeyTemplate {
    pub const ALL: [KeyTemplate; 13] = [
        KeyTemplate::CurrentUser,
        KeyTemplate::Users,
        KeyTemplate::DailyGoal,
        KeyTemplate::DailyActivity,
        KeyTemplate::FirstDayBonus,
        KeyTemplate::ReferralShown,
        KeyTemplate::AiUsage,
        KeyTemplate::ChallengeStarted,
        KeyTemplate::LastReadUpdate,
        KeyTemplate::UpdateAlertShown,
        KeyTemplate::AudioGuideEnabled,
        KeyTemplate::PreferredVoice,
        KeyTemplate::VoiceScripts,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            KeyTemplate::CurrentUser => "current_user",
            KeyTemplate::Users => "users",
            KeyTemplate::DailyGoal => "goal",
            KeyTemplate::DailyActivity => "activity",
            KeyTemplate::FirstDayBonus => "first_day_bonus",
            KeyTemplate::ReferralShown => "referral_shown",
            KeyTemplate::AiUsage => "ai_usage",
            KeyTemplate::ChallengeStarted => "challenge_started",
            KeyTemplate::LastReadUpdate => "last_read_update",
            KeyTemplate::UpdateAlertShown => "update_alert_shown",
            KeyTemplate::AudioGuideEnabled => "audio_guide_enabled",
            KeyTemplate::PreferredVoice => "preferred_voice_uri",
            KeyTemplate::VoiceScripts => "voice_scripts",
        }
    }
}

/// The signed-in user's cached profile.
pub struct CurrentUserKey;

impl StorageKey for CurrentUserKey {
    type Value = UserProfile;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::CurrentUser
    }
}

/// Every profile known on this device.
pub struct UsersKey;

impl StorageKey for UsersKey {
    type Value = Vec<UserProfile>;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::Users
    }
}

pub struct DailyGoalKey<'a> {
    pub user_id: &'a str,
}

impl StorageKey for DailyGoalKey<'_> {
    type Value = DailyGoal;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::DailyGoal
    }
    fn suffix(&self) -> String {
        self.user_id.to_string()
    }
}

/// Seconds studied on one calendar day.
pub struct DailyActivityKey<'a> {
    pub user_id: &'a str,
    pub day: NaiveDate,
}

impl StorageKey for DailyActivityKey<'_> {
    type Value = u64;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::DailyActivity
    }
    fn suffix(&self) -> String {
        format!("{}:{}", self.user_id, day_key(self.day))
    }
}

pub struct FirstDayBonusKey<'a> {
    pub user_id: &'a str,
}

impl StorageKey for FirstDayBonusKey<'_> {
    type Value = bool;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::FirstDayBonus
    }
    fn suffix(&self) -> String {
        self.user_id.to_string()
    }
}

pub struct ReferralShownKey<'a> {
    pub user_id: &'a str,
}

impl StorageKey for ReferralShownKey<'_> {
    type Value = bool;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::ReferralShown
    }
    fn suffix(&self) -> String {
        self.user_id.to_string()
    }
}

/// AI note generations used on one calendar day.
pub struct AiUsageKey<'a> {
    pub user_id: &'a str,
    pub day: NaiveDate,
}

impl StorageKey for AiUsageKey<'_> {
    type Value = u32;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::AiUsage
    }
    fn suffix(&self) -> String {
        format!("{}:{}", self.user_id, day_key(self.day))
    }
}

pub struct ChallengeStartedKey<'a> {
    pub user_id: &'a str,
    pub challenge_id: &'a str,
}

impl StorageKey for ChallengeStartedKey<'_> {
    type Value = DateTime<Utc>;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::ChallengeStarted
    }
    fn suffix(&self) -> String {
        format!("{}:{}", self.user_id, self.challenge_id)
    }
}

pub struct LastReadUpdateKey;

impl StorageKey for LastReadUpdateKey {
    type Value = DateTime<Utc>;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::LastReadUpdate
    }
}

pub struct UpdateAlertShownKey<'a> {
    pub update_id: &'a str,
}

impl StorageKey for UpdateAlertShownKey<'_> {
    type Value = bool;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::UpdateAlertShown
    }
    fn suffix(&self) -> String {
        self.update_id.to_string()
    }
}

pub struct AudioGuideEnabledKey;

impl StorageKey for AudioGuideEnabledKey {
    type Value = bool;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::AudioGuideEnabled
    }
}

pub struct PreferredVoiceKey;

impl StorageKey for PreferredVoiceKey {
    type Value = String;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::PreferredVoice
    }
}

/// Admin-provided overrides for voice guide texts, keyed by guide key.
pub struct VoiceScriptsKey;

impl StorageKey for VoiceScriptsKey {
    type Value = HashMap<String, String>;
    fn template(&self) -> KeyTemplate {
        KeyTemplate::VoiceScripts
    }
}
