//! Periodic persistence of study time.
//!
//! Each tick writes the current "seconds studied today" to the remote status
//! record and to the local day snapshot, then checks the first-day bonus.
//! A failed write is logged and left for the next tick: every value written
//! here is a snapshot, so rewriting it later converges.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::activity::record_day;
use crate::error::Result;
use crate::events::Event;
use crate::notice::Notice;
use crate::profile::UserProfile;
use crate::storage::keys::FirstDayBonusKey;
use crate::storage::{FirstDayBonusConfig, LocalCache};
use crate::sync::{ProfileState, RemoteHandles};

/// What one tick managed to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub seconds_today: u64,
    pub remote_status_written: bool,
    pub local_snapshot_written: bool,
    pub bonus: Option<BonusGrant>,
}

/// A first-day bonus that was just granted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusGrant {
    pub expires_at: DateTime<Utc>,
}

pub struct PeriodicPersister {
    profile: Arc<ProfileState>,
    cache: LocalCache,
    remote: RemoteHandles,
    bonus: FirstDayBonusConfig,
    events: broadcast::Sender<Event>,
}

impl PeriodicPersister {
    pub fn new(
        profile: Arc<ProfileState>,
        cache: LocalCache,
        remote: RemoteHandles,
        bonus: FirstDayBonusConfig,
        events: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            profile,
            cache,
            remote,
            bonus,
            events,
        }
    }

    /// Run one tick. Never fails: each step degrades to "not written this tick".
    pub async fn tick(&self, seconds_today: u64, now: DateTime<Utc>) -> TickReport {
        let user_id = self.profile.user_id();

        let remote_status_written = match self.remote.status.update_status(&user_id, seconds_today).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "status write failed; retrying next tick");
                false
            }
        };

        let day = now.with_timezone(&Local).date_naive();
        let local_snapshot_written = match record_day(&self.cache, &user_id, day, seconds_today).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "day snapshot write failed; retrying next tick");
                false
            }
        };

        let bonus = match self.check_first_day_bonus(seconds_today, now).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "first-day bonus check failed; retrying next tick");
                None
            }
        };

        debug!(user_id = %user_id, seconds_today, remote_status_written, local_snapshot_written, "tick persisted");
        let _ = self.events.send(Event::TickPersisted {
            user_id,
            seconds_today,
            local_ok: local_snapshot_written,
            remote_ok: remote_status_written,
            at: now,
        });

        TickReport {
            seconds_today,
            remote_status_written,
            local_snapshot_written,
            bonus,
        }
    }

    /// Grant the one-time bonus when the account is young enough, enough time
    /// was studied today and this device has not granted it before.
    ///
    /// Only the local flag guards the grant. Two devices ticking before either
    /// flag exists can both grant it.
    async fn check_first_day_bonus(
        &self,
        seconds_today: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<BonusGrant>> {
        if !self.bonus.enabled || seconds_today < self.bonus.required_seconds {
            return Ok(None);
        }
        let current = self.profile.current();
        let young = current
            .account_age(now)
            .is_some_and(|age| self.bonus.max_account_age().map_or(true, |max| age < max));
        if !young {
            return Ok(None);
        }

        let flag = FirstDayBonusKey {
            user_id: &current.id,
        };
        if self.cache.load(&flag).await?.unwrap_or(false) {
            return Ok(None);
        }

        let Some(expires_at) = self
            .bonus
            .grant_duration()
            .and_then(|grant| now.checked_add_signed(grant))
        else {
            warn!(user_id = %current.id, grant_minutes = self.bonus.grant_minutes, "first-day bonus length out of range; not granted");
            return Ok(None);
        };
        let Some(granted) = self
            .profile
            .update(|profile| Some(self.apply_bonus(profile, expires_at)))
        else {
            return Ok(None);
        };

        self.cache.save_profile(&granted).await?;
        if let Err(e) = self.remote.profiles.save_profile(&granted).await {
            warn!(user_id = %granted.id, error = %e, "remote save of bonus profile failed");
        }
        self.cache.save(&flag, &true).await?;

        info!(user_id = %granted.id, %expires_at, "first-day bonus granted");
        let _ = self.events.send(Event::FirstDayBonusGranted {
            user_id: granted.id.clone(),
            tier: self.bonus.tier,
            level: self.bonus.level,
            expires_at,
            at: now,
        });
        let notice = Notice::success(format!(
            "FIRST DAY BONUS: You unlocked {} minutes of free {:?} subscription!",
            self.bonus.grant_minutes, self.bonus.level
        ));
        let _ = self.events.send(Event::Notice { notice, at: now });

        Ok(Some(BonusGrant { expires_at }))
    }

    fn apply_bonus(&self, profile: &UserProfile, expires_at: DateTime<Utc>) -> UserProfile {
        let mut next = profile.clone();
        next.subscription_tier = Some(self.bonus.tier);
        next.subscription_level = Some(self.bonus.level);
        next.is_premium = true;
        next.subscription_end_date = Some(expires_at);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::keys::DailyActivityKey;
    use crate::storage::MemoryStore;
    use crate::sync::InMemoryRemote;
    use chrono::Duration;

    fn setup(created: DateTime<Utc>) -> (PeriodicPersister, Arc<ProfileState>, LocalCache, Arc<InMemoryRemote>) {
        setup_with(created, FirstDayBonusConfig::default())
    }

    fn setup_with(
        created: DateTime<Utc>,
        bonus: FirstDayBonusConfig,
    ) -> (PeriodicPersister, Arc<ProfileState>, LocalCache, Arc<InMemoryRemote>) {
        let mut profile = UserProfile::new("u1", "A", "a@x");
        profile.created_at = Some(created);
        let state = Arc::new(ProfileState::new(profile));
        let cache = LocalCache::new(Arc::new(MemoryStore::new()));
        let remote = Arc::new(InMemoryRemote::new());
        let (events, _) = broadcast::channel(16);
        let persister = PeriodicPersister::new(
            state.clone(),
            cache.clone(),
            RemoteHandles::from_backend(remote.clone()),
            bonus,
            events,
        );
        (persister, state, cache, remote)
    }

    #[tokio::test]
    async fn tick_writes_status_and_day_snapshot() {
        let now = Utc::now();
        let (persister, _, cache, remote) = setup(now - Duration::days(30));
        let report = persister.tick(1200, now).await;
        assert!(report.remote_status_written);
        assert!(report.local_snapshot_written);
        assert!(report.bonus.is_none());
        assert_eq!(remote.status("u1").unwrap().seconds_today, 1200);

        let day = now.with_timezone(&Local).date_naive();
        let stored = cache
            .load(&DailyActivityKey { user_id: "u1", day })
            .await
            .unwrap();
        assert_eq!(stored, Some(1200));
    }

    #[tokio::test]
    async fn offline_remote_does_not_block_local_snapshot() {
        let now = Utc::now();
        let (persister, _, _, remote) = setup(now - Duration::days(30));
        remote.set_offline(true);
        let report = persister.tick(60, now).await;
        assert!(!report.remote_status_written);
        assert!(report.local_snapshot_written);
    }

    #[tokio::test]
    async fn bonus_needs_an_hour_of_study() {
        let now = Utc::now();
        let (persister, state, _, _) = setup(now - Duration::minutes(10));
        let report = persister.tick(3599, now).await;
        assert!(report.bonus.is_none());
        assert!(!state.current().is_premium);
    }

    #[tokio::test]
    async fn bonus_skips_accounts_older_than_a_day() {
        let now = Utc::now();
        let (persister, state, _, _) = setup(now - Duration::hours(25));
        assert!(persister.tick(7200, now).await.bonus.is_none());
        assert!(!state.current().is_premium);
    }

    #[tokio::test]
    async fn bonus_granted_once() {
        let now = Utc::now();
        let (persister, state, cache, remote) = setup(now - Duration::minutes(10));

        let grant = persister.tick(3600, now).await.bonus.unwrap();
        assert_eq!(grant.expires_at, now + Duration::hours(1));
        let profile = state.current();
        assert!(profile.is_premium);
        assert!(profile.premium_active(now));
        assert_eq!(cache.current_user().await.unwrap().unwrap(), profile);
        assert_eq!(remote.document("u1").unwrap()["isPremium"], serde_json::json!(true));

        let later = now + Duration::minutes(1);
        assert!(persister.tick(3660, later).await.bonus.is_none());
        assert_eq!(state.current().subscription_end_date, Some(now + Duration::hours(1)));
    }

    #[tokio::test]
    async fn oversized_grant_length_skips_bonus() {
        let now = Utc::now();
        let bonus = FirstDayBonusConfig {
            grant_minutes: i64::MAX,
            ..FirstDayBonusConfig::default()
        };
        let (persister, state, _, _) = setup_with(now - Duration::minutes(10), bonus);
        let report = persister.tick(3600, now).await;
        assert!(report.bonus.is_none());
        assert!(report.local_snapshot_written);
        assert!(!state.current().is_premium);
    }

    #[tokio::test]
    async fn oversized_account_age_limit_counts_every_account() {
        let now = Utc::now();
        let bonus = FirstDayBonusConfig {
            max_account_age_hours: i64::MAX,
            ..FirstDayBonusConfig::default()
        };
        let (persister, state, _, _) = setup_with(now - Duration::days(400), bonus);
        assert!(persister.tick(3600, now).await.bonus.is_some());
        assert!(state.current().is_premium);
    }
}
