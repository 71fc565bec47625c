//! The user profile schema shared by the local cache and the remote document.
//!
//! Field names are camelCase on the wire. Every field but `id` is optional on
//! read: a field that is missing or has the wrong shape falls back to its
//! default instead of failing the whole document.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Paid subscription level, gating reward amounts and AI quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionLevel {
    Basic,
    Ultra,
}

/// Billing period of the current subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    Free,
    Weekly,
    Monthly,
    Yearly,
    Lifetime,
}

/// Kind of an inbox message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    #[default]
    Info,
    Gift,
}

/// A message in the user's inbox. Only the read flag is ever changed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxMessage {
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: MessageKind,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub read: bool,
}

/// A student's profile.
///
/// The remote document is canonical; the locally cached copy is the working
/// copy that gets mutated optimistically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub email: String,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub class_level: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,

    #[serde(default, deserialize_with = "lenient_count")]
    pub credits: u64,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<SubscriptionTier>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subscription_level: Option<SubscriptionLevel>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_premium: bool,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subscription_end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_auto_deduct_enabled: bool,

    #[serde(default, deserialize_with = "lenient")]
    pub streak: u32,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_reward_claim_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub inbox: Vec<InboxMessage>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub redeemed_referral_code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_game_banned: bool,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            created_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Premium flag set and the subscription has not yet ended.
    pub fn premium_active(&self, now: DateTime<Utc>) -> bool {
        self.is_premium && self.subscription_end_date.is_some_and(|end| end > now)
    }

    /// Level that counts for rewards and quotas: only honoured while the premium flag is set.
    pub fn effective_level(&self) -> Option<SubscriptionLevel> {
        if self.is_premium {
            self.subscription_level
        } else {
            None
        }
    }

    /// Time since account creation. `None` when the creation date is unknown.
    pub fn account_age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.created_at.map(|created| now - created)
    }
}

/// Deserialize `T`, falling back to `T::default()` when the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Non-negative whole number, also accepted in float form (`50.0`).
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let count = match value.as_u64() {
        Some(n) => n,
        None => value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
            .unwrap_or_default(),
    };
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_names_are_camel_case() {
        let mut profile = UserProfile::new("u1", "Asha", "asha@example.com");
        profile.is_premium = true;
        profile.subscription_level = Some(SubscriptionLevel::Ultra);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["isPremium"], json!(true));
        assert_eq!(json["subscriptionLevel"], json!("ULTRA"));
        assert!(json.get("subscriptionTier").is_none());
        assert!(json.get("isGameBanned").is_some());
    }

    #[test]
    fn malformed_fields_fall_back_to_absent() {
        let doc = json!({
            "id": "u1",
            "credits": "lots",
            "subscriptionTier": "PLATINUM",
            "lastRewardClaimDate": "not a date",
            "isPremium": true,
        });
        let profile: UserProfile = serde_json::from_value(doc).unwrap();
        assert_eq!(profile.credits, 0);
        assert_eq!(profile.subscription_tier, None);
        assert_eq!(profile.last_reward_claim_date, None);
        assert!(profile.is_premium);
    }

    #[test]
    fn whole_float_credits_are_accepted() {
        let parsed = |credits: serde_json::Value| {
            serde_json::from_value::<UserProfile>(json!({ "id": "u1", "credits": credits }))
                .unwrap()
                .credits
        };
        assert_eq!(parsed(json!(50.0)), 50);
        assert_eq!(parsed(json!(50.5)), 0);
        assert_eq!(parsed(json!(-3)), 0);
    }

    #[test]
    fn missing_id_is_rejected() {
        let doc = json!({ "name": "nobody" });
        assert!(serde_json::from_value::<UserProfile>(doc).is_err());
    }

    #[test]
    fn premium_requires_future_end_date() {
        let now = Utc::now();
        let mut profile = UserProfile::new("u1", "A", "a@x");
        profile.is_premium = true;
        assert!(!profile.premium_active(now));
        profile.subscription_end_date = Some(now + Duration::hours(1));
        assert!(profile.premium_active(now));
        profile.subscription_end_date = Some(now - Duration::seconds(1));
        assert!(!profile.premium_active(now));
    }

    #[test]
    fn level_ignored_without_premium_flag() {
        let mut profile = UserProfile::new("u1", "A", "a@x");
        profile.subscription_level = Some(SubscriptionLevel::Basic);
        assert_eq!(profile.effective_level(), None);
        profile.is_premium = true;
        assert_eq!(profile.effective_level(), Some(SubscriptionLevel::Basic));
    }

    #[test]
    fn inbox_message_kind_uses_type_tag() {
        let msg: InboxMessage = serde_json::from_value(json!({
            "id": "m1", "type": "GIFT", "text": "50 credits", "read": false
        }))
        .unwrap();
        assert_eq!(msg.kind, MessageKind::Gift);
        assert!(!msg.read);
    }
}
