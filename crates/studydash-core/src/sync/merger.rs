//! Reconciliation of the local working profile with remote snapshots.
//!
//! Only four fields are watched. When any of them differs, the whole remote
//! document is shallow-merged over the local profile: every key the remote
//! carries wins, keys it lacks keep their local value. Unsynced local edits
//! to other fields that land in the same window are overwritten.

use serde_json::Value;
use tracing::warn;

use super::remote::RemoteDocument;
use crate::profile::UserProfile;

/// Profile fields whose divergence triggers a remote-wins merge.
pub const SYNCED_FIELDS: [&str; 4] = ["credits", "subscriptionTier", "isPremium", "isGameBanned"];

/// Merge decision for an incoming snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeDecision {
    /// Nothing to emit; the working copy stays as it is.
    Keep,
    /// Replace the working copy with the merged profile.
    Replace(UserProfile),
}

/// Synced fields on which `remote` disagrees with `local`.
///
/// Both sides are compared after the remote has been read through the profile
/// schema, so an absent or unreadable remote field means the same thing it
/// would mean once stored. A snapshot that fails the schema diverges nowhere.
pub fn diverged_fields(local: &UserProfile, remote: &RemoteDocument) -> Vec<&'static str> {
    overlay(local, remote)
        .map(|merged| synced_differences(local, &merged))
        .unwrap_or_default()
}

/// Decide what a remote snapshot does to the local profile.
pub fn merge_remote(local: &UserProfile, remote: &RemoteDocument) -> MergeDecision {
    let merged = match overlay(local, remote) {
        Ok(profile) => profile,
        Err(e) => {
            warn!(user_id = %local.id, error = %e, "dropping remote snapshot that fails the profile schema");
            return MergeDecision::Keep;
        }
    };
    if merged == *local || synced_differences(local, &merged).is_empty() {
        return MergeDecision::Keep;
    }
    MergeDecision::Replace(merged)
}

/// `local` with every key of `remote` written over it, read back as a profile.
fn overlay(local: &UserProfile, remote: &RemoteDocument) -> serde_json::Result<UserProfile> {
    let mut merged = match serde_json::to_value(local)? {
        Value::Object(map) => map,
        _ => RemoteDocument::new(),
    };
    for (key, value) in remote {
        merged.insert(key.clone(), value.clone());
    }
    serde_json::from_value(Value::Object(merged))
}

fn synced_differences(local: &UserProfile, merged: &UserProfile) -> Vec<&'static str> {
    let (Ok(Value::Object(before)), Ok(Value::Object(after))) =
        (serde_json::to_value(local), serde_json::to_value(merged))
    else {
        return Vec::new();
    };
    SYNCED_FIELDS
        .into_iter()
        .filter(|field| before.get(*field) != after.get(*field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SubscriptionTier;
    use serde_json::json;

    fn doc(value: Value) -> RemoteDocument {
        value.as_object().cloned().unwrap()
    }

    fn local() -> UserProfile {
        let mut profile = UserProfile::new("u1", "Asha", "asha@example.com");
        profile.credits = 50;
        profile.class_level = Some("10".into());
        profile
    }

    #[test]
    fn identical_synced_fields_keep_local() {
        let remote = doc(json!({
            "id": "u1",
            "credits": 50.0,
            "isPremium": false,
            "isGameBanned": false,
            "name": "Someone Else",
        }));
        assert!(diverged_fields(&local(), &remote).is_empty());
        assert_eq!(merge_remote(&local(), &remote), MergeDecision::Keep);
    }

    #[test]
    fn divergence_takes_every_remote_key() {
        let remote = doc(json!({
            "id": "u1",
            "credits": 80,
            "subscriptionTier": "MONTHLY",
            "isPremium": false,
            "isGameBanned": false,
            "name": "Asha K",
        }));
        assert_eq!(
            diverged_fields(&local(), &remote),
            vec!["credits", "subscriptionTier"]
        );

        let MergeDecision::Replace(merged) = merge_remote(&local(), &remote) else {
            panic!("expected replace");
        };
        assert_eq!(merged.credits, 80);
        assert_eq!(merged.subscription_tier, Some(SubscriptionTier::Monthly));
        assert_eq!(merged.name, "Asha K");
        // keys absent from the remote keep their local value
        assert_eq!(merged.class_level.as_deref(), Some("10"));
    }

    #[test]
    fn absent_synced_fields_keep_local() {
        let remote = doc(json!({
            "id": "u1",
            "name": "A",
            "email": "a@x",
            "credits": 50,
            "isPremium": false,
        }));
        assert!(diverged_fields(&local(), &remote).is_empty());
        assert_eq!(merge_remote(&local(), &remote), MergeDecision::Keep);
    }

    #[test]
    fn unknown_tier_converges_after_one_replace() {
        let mut subscribed = local();
        subscribed.subscription_tier = Some(SubscriptionTier::Monthly);
        let remote = doc(json!({ "id": "u1", "credits": 50, "subscriptionTier": "PLATINUM" }));

        assert_eq!(diverged_fields(&subscribed, &remote), vec!["subscriptionTier"]);
        let MergeDecision::Replace(merged) = merge_remote(&subscribed, &remote) else {
            panic!("expected replace");
        };
        assert_eq!(merged.subscription_tier, None);

        assert!(diverged_fields(&merged, &remote).is_empty());
        assert_eq!(merge_remote(&merged, &remote), MergeDecision::Keep);
    }

    #[test]
    fn schema_breaking_snapshot_is_dropped() {
        let remote = doc(json!({ "id": 7, "credits": 99 }));
        assert_eq!(merge_remote(&local(), &remote), MergeDecision::Keep);
        assert!(diverged_fields(&local(), &remote).is_empty());
    }
}
