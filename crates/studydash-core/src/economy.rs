//! Credit spending: paid external apps, profile edits and name changes.
//!
//! Every function here is pure. It takes the current profile and returns the
//! updated one, or the notice explaining why nothing changed. Writing the
//! result through is the session's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notice::Notice;
use crate::profile::UserProfile;

/// An external app listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalApp {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub credit_cost: u64,
    #[serde(default)]
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAccess {
    /// Free app, open it.
    Open { url: String },
    /// Paid app and auto-deduct is off. Ask before charging.
    NeedsConfirmation { cost: u64 },
    /// Credits were deducted; `profile` is the updated copy.
    Charged {
        url: String,
        cost: u64,
        profile: UserProfile,
    },
    Denied(Notice),
}

/// Decide what happens when the user taps an external app.
pub fn request_app_access(profile: &UserProfile, app: &ExternalApp) -> AppAccess {
    if app.is_locked {
        return AppAccess::Denied(Notice::error("This app is currently locked by Admin."));
    }
    if app.credit_cost == 0 {
        return AppAccess::Open {
            url: app.url.clone(),
        };
    }
    if profile.credits < app.credit_cost {
        return AppAccess::Denied(Notice::error(format!(
            "Insufficient Credits! You need {} credits.",
            app.credit_cost
        )));
    }
    if profile.is_auto_deduct_enabled {
        return charge(profile, app, false);
    }
    AppAccess::NeedsConfirmation {
        cost: app.credit_cost,
    }
}

/// The user confirmed a paid access. `enable_auto_deduct` skips future confirmations.
pub fn confirm_app_access(profile: &UserProfile, app: &ExternalApp, enable_auto_deduct: bool) -> AppAccess {
    if app.is_locked {
        return AppAccess::Denied(Notice::error("This app is currently locked by Admin."));
    }
    if profile.credits < app.credit_cost {
        return AppAccess::Denied(Notice::error(format!(
            "Insufficient Credits! You need {} credits.",
            app.credit_cost
        )));
    }
    charge(profile, app, enable_auto_deduct)
}

fn charge(profile: &UserProfile, app: &ExternalApp, enable_auto_deduct: bool) -> AppAccess {
    let mut updated = profile.clone();
    updated.credits -= app.credit_cost;
    if enable_auto_deduct {
        updated.is_auto_deduct_enabled = true;
    }
    AppAccess::Charged {
        url: app.url.clone(),
        cost: app.credit_cost,
        profile: updated,
    }
}

/// Academic details the user may change from the profile screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEdit {
    pub board: Option<String>,
    pub class_level: Option<String>,
    pub stream: Option<String>,
}

/// Apply a profile edit. Free while premium is active, otherwise costs `cost`.
pub fn apply_profile_edit(
    profile: &UserProfile,
    edit: &ProfileEdit,
    cost: u64,
    now: DateTime<Utc>,
) -> Result<UserProfile, Notice> {
    let premium = profile.premium_active(now);
    if !premium && profile.credits < cost {
        return Err(Notice::error(format!(
            "Profile update costs {cost} NST Coins.\nYou have {} coins.",
            profile.credits
        )));
    }

    let mut updated = profile.clone();
    if let Some(board) = &edit.board {
        updated.board = Some(board.clone());
    }
    if let Some(class_level) = &edit.class_level {
        updated.class_level = Some(class_level.clone());
    }
    if let Some(stream) = &edit.stream {
        updated.stream = Some(stream.clone());
    }
    if !premium {
        updated.credits -= cost;
    }
    Ok(updated)
}

/// Rename the user for `cost` credits. An empty or unchanged name is rejected.
pub fn rename(profile: &UserProfile, new_name: &str, cost: u64) -> Result<UserProfile, Notice> {
    let new_name = new_name.trim();
    if new_name.is_empty() || new_name == profile.name {
        return Err(Notice::info("Name unchanged."));
    }
    if profile.credits < cost {
        return Err(Notice::error(format!("Insufficient Coins! Need {cost}.")));
    }
    let mut updated = profile.clone();
    updated.name = new_name.to_string();
    updated.credits -= cost;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use chrono::Duration;

    fn app(cost: u64) -> ExternalApp {
        ExternalApp {
            id: "a1".into(),
            name: "Lab".into(),
            url: "https://lab.example".into(),
            credit_cost: cost,
            is_locked: false,
        }
    }

    fn user(credits: u64) -> UserProfile {
        let mut profile = UserProfile::new("u1", "Asha", "a@x");
        profile.credits = credits;
        profile
    }

    #[test]
    fn locked_app_is_denied() {
        let mut locked = app(0);
        locked.is_locked = true;
        let AppAccess::Denied(notice) = request_app_access(&user(100), &locked) else {
            panic!("expected denial");
        };
        assert_eq!(notice.message, "This app is currently locked by Admin.");
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    #[test]
    fn free_app_opens() {
        assert_eq!(
            request_app_access(&user(0), &app(0)),
            AppAccess::Open {
                url: "https://lab.example".into()
            }
        );
    }

    #[test]
    fn paid_app_asks_then_charges() {
        let profile = user(30);
        assert_eq!(
            request_app_access(&profile, &app(20)),
            AppAccess::NeedsConfirmation { cost: 20 }
        );

        let AppAccess::Charged { profile: charged, .. } = confirm_app_access(&profile, &app(20), true) else {
            panic!("expected charge");
        };
        assert_eq!(charged.credits, 10);
        assert!(charged.is_auto_deduct_enabled);
    }

    #[test]
    fn auto_deduct_skips_confirmation() {
        let mut profile = user(30);
        profile.is_auto_deduct_enabled = true;
        let AppAccess::Charged { cost, profile, .. } = request_app_access(&profile, &app(20)) else {
            panic!("expected charge");
        };
        assert_eq!(cost, 20);
        assert_eq!(profile.credits, 10);
    }

    #[test]
    fn insufficient_credits_denied() {
        let AppAccess::Denied(notice) = request_app_access(&user(5), &app(20)) else {
            panic!("expected denial");
        };
        assert_eq!(notice.message, "Insufficient Credits! You need 20 credits.");
    }

    #[test]
    fn profile_edit_free_while_premium() {
        let now = Utc::now();
        let mut profile = user(0);
        profile.is_premium = true;
        profile.subscription_end_date = Some(now + Duration::days(3));
        let edit = ProfileEdit {
            board: Some("ICSE".into()),
            ..Default::default()
        };
        let updated = apply_profile_edit(&profile, &edit, 10, now).unwrap();
        assert_eq!(updated.board.as_deref(), Some("ICSE"));
        assert_eq!(updated.credits, 0);
    }

    #[test]
    fn profile_edit_charges_after_premium_expires() {
        let now = Utc::now();
        let mut profile = user(12);
        profile.is_premium = true;
        profile.subscription_end_date = Some(now - Duration::minutes(1));
        let edit = ProfileEdit {
            class_level: Some("11".into()),
            ..Default::default()
        };
        let updated = apply_profile_edit(&profile, &edit, 10, now).unwrap();
        assert_eq!(updated.credits, 2);
        assert_eq!(updated.class_level.as_deref(), Some("11"));

        assert!(apply_profile_edit(&updated, &edit, 10, now).is_err());
    }

    #[test]
    fn rename_costs_coins() {
        let renamed = rename(&user(10), "Ravi", 10).unwrap();
        assert_eq!(renamed.name, "Ravi");
        assert_eq!(renamed.credits, 0);

        let err = rename(&user(9), "Ravi", 10).unwrap_err();
        assert_eq!(err.message, "Insufficient Coins! Need 10.");
        assert!(rename(&user(50), "Asha", 10).is_err());
    }
}
