//! The dashboard session.
//!
//! A session owns everything that runs in the background for a signed-in
//! user: the periodic persistence ticker and the remote profile listener.
//! Both are torn down together by [`DashboardSession::shutdown`], or when the
//! session is dropped.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Local, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::activity::ActivityReader;
use crate::economy::{self, AppAccess, ExternalApp, ProfileEdit};
use crate::error::Result;
use crate::events::Event;
use crate::goal::{load_goal, save_goal, DailyGoal, DEFAULT_GOAL};
use crate::notice::Notice;
use crate::persister::PeriodicPersister;
use crate::profile::{mark_all_read, UserProfile};
use crate::reward::{self, ClaimOutcome, RewardClaimState};
use crate::storage::{Config, LocalCache};
use crate::sync::{ProfileState, ProfileSubscription, RemoteHandles};

const EVENT_CAPACITY: usize = 64;

pub struct DashboardSession {
    profile: Arc<ProfileState>,
    activity: ActivityReader,
    cache: LocalCache,
    remote: RemoteHandles,
    config: Config,
    goal: RwLock<DailyGoal>,
    events: broadcast::Sender<Event>,
    ticker: Option<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
}

impl DashboardSession {
    /// Start a session for `profile`. Must be called inside a tokio runtime.
    ///
    /// A failed remote subscription is logged and the session runs without
    /// remote updates; the ticker still starts.
    pub async fn start(
        profile: UserProfile,
        activity: ActivityReader,
        cache: LocalCache,
        remote: RemoteHandles,
        config: Config,
    ) -> Result<Self> {
        let default_goal = DailyGoal::from_hours(config.goal.default_hours).unwrap_or(DEFAULT_GOAL);
        let goal = load_goal(&cache, &profile.id, default_goal).await?;
        let user_id = profile.id.clone();

        let profile = Arc::new(ProfileState::new(profile));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let persister = Arc::new(PeriodicPersister::new(
            profile.clone(),
            cache.clone(),
            remote.clone(),
            config.first_day_bonus.clone(),
            events.clone(),
        ));

        let listener = match remote.channel.subscribe(&user_id).await {
            Ok(subscription) => Some(tokio::spawn(listen(
                subscription,
                profile.clone(),
                cache.clone(),
                events.clone(),
            ))),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "remote subscription failed; running without remote updates");
                None
            }
        };

        let period = config.session.tick_interval();
        let ticker = tokio::spawn(run_ticker(persister, activity.clone(), period));

        info!(user_id = %user_id, goal_secs = goal.seconds(), "session started");
        Ok(Self {
            profile,
            activity,
            cache,
            remote,
            config,
            goal: RwLock::new(goal),
            events,
            ticker: Some(ticker),
            listener,
        })
    }

    pub fn profile(&self) -> UserProfile {
        self.profile.current()
    }

    pub fn watch_profile(&self) -> watch::Receiver<UserProfile> {
        self.profile.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn seconds_today(&self) -> u64 {
        self.activity.seconds_today()
    }

    pub fn goal(&self) -> DailyGoal {
        *self.goal.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Pick a new daily goal and persist it locally.
    pub async fn set_goal(&self, goal: DailyGoal) -> Result<()> {
        save_goal(&self.cache, &self.profile.user_id(), goal).await?;
        *self.goal.write().unwrap_or_else(|e| e.into_inner()) = goal;
        Ok(())
    }

    /// Current reward eligibility, recomputed from live values.
    pub fn reward_state(&self, now: DateTime<Local>) -> RewardClaimState {
        RewardClaimState::evaluate(
            self.seconds_today(),
            self.goal().seconds(),
            self.profile.current().last_reward_claim_date,
            now,
        )
    }

    pub async fn claim_reward(&self) -> Option<Notice> {
        self.claim_reward_at(Utc::now()).await
    }

    /// Claim today's reward. Returns the notice to show, or `None` when the
    /// claim was ignored because the user is not eligible.
    pub async fn claim_reward_at(&self, now: DateTime<Utc>) -> Option<Notice> {
        let seconds = self.seconds_today();
        let goal = self.goal().seconds();
        let mut amount = 0;
        let updated = self.profile.update(|current| {
            match reward::claim(current, seconds, goal, &self.config.rewards, now) {
                ClaimOutcome::Claimed { amount: a, profile } => {
                    amount = a;
                    Some(profile)
                }
                ClaimOutcome::Ignored => None,
            }
        });
        let Some(updated) = updated else {
            debug!(seconds, goal, "reward claim ignored");
            return None;
        };

        self.persist(&updated).await;
        info!(user_id = %updated.id, amount, credits = updated.credits, "daily reward claimed");
        let _ = self.events.send(Event::RewardClaimed {
            user_id: updated.id.clone(),
            amount,
            credits: updated.credits,
            at: now,
        });
        let notice = Notice::success(format!("Received: {amount} Free Credits!")).titled("Daily Goal Met");
        self.emit_notice(notice.clone(), now);
        Some(notice)
    }

    /// Mark every inbox message read. Returns false when nothing was unread.
    pub async fn mark_inbox_read(&self) -> bool {
        let Some(updated) = self.profile.update(mark_all_read) else {
            return false;
        };
        self.persist(&updated).await;
        let _ = self.events.send(Event::InboxRead {
            user_id: updated.id,
            at: Utc::now(),
        });
        true
    }

    /// Request access to a paid external app.
    pub async fn open_app(&self, app: &ExternalApp) -> AppAccess {
        self.settle_access(|current| economy::request_app_access(current, app))
            .await
    }

    /// Confirm a pending paid access, optionally enabling auto-deduct.
    pub async fn confirm_app(&self, app: &ExternalApp, enable_auto_deduct: bool) -> AppAccess {
        self.settle_access(|current| economy::confirm_app_access(current, app, enable_auto_deduct))
            .await
    }

    async fn settle_access<F>(&self, decide: F) -> AppAccess
    where
        F: Fn(&UserProfile) -> AppAccess,
    {
        let (access, stored) = self.profile.update_with(|current| {
            let access = decide(current);
            let next = match &access {
                AppAccess::Charged { profile, .. } => Some(profile.clone()),
                _ => None,
            };
            (access, next)
        });
        if let Some(profile) = &stored {
            self.persist(profile).await;
        }
        match &access {
            AppAccess::Charged { profile, cost, url } => {
                let _ = self.events.send(Event::CreditsSpent {
                    user_id: profile.id.clone(),
                    amount: *cost,
                    reason: format!("app access: {url}"),
                    at: Utc::now(),
                });
            }
            AppAccess::Denied(notice) => self.emit_notice(notice.clone(), Utc::now()),
            AppAccess::Open { .. } | AppAccess::NeedsConfirmation { .. } => {}
        }
        access
    }

    /// Change board / class / stream, charging unless premium is active.
    pub async fn edit_profile(&self, edit: &ProfileEdit) -> std::result::Result<UserProfile, Notice> {
        let now = Utc::now();
        let cost = self.config.economy.profile_edit_cost;
        self.charge(|current| economy::apply_profile_edit(current, edit, cost, now), now)
            .await
    }

    pub async fn rename(&self, new_name: &str) -> std::result::Result<UserProfile, Notice> {
        let cost = self.config.economy.name_change_cost;
        self.charge(|current| economy::rename(current, new_name, cost), Utc::now())
            .await
    }

    /// Apply a paid change to the latest working copy and write it through.
    async fn charge<F>(&self, change: F, now: DateTime<Utc>) -> std::result::Result<UserProfile, Notice>
    where
        F: Fn(&UserProfile) -> std::result::Result<UserProfile, Notice>,
    {
        let (outcome, _) = self.profile.update_with(|current| {
            let outcome = change(current);
            let next = outcome.as_ref().ok().cloned();
            (outcome, next)
        });
        match outcome {
            Ok(updated) => {
                self.persist(&updated).await;
                Ok(updated)
            }
            Err(notice) => {
                self.emit_notice(notice.clone(), now);
                Err(notice)
            }
        }
    }

    /// Stop the ticker and the remote listener and wait for both to finish.
    pub async fn shutdown(mut self) {
        for handle in [self.ticker.take(), self.listener.take()].into_iter().flatten() {
            handle.abort();
            let _ = handle.await;
        }
        info!(user_id = %self.profile.user_id(), "session stopped");
    }

    /// True while the background ticker is alive.
    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    async fn persist(&self, profile: &UserProfile) {
        if let Err(e) = self.cache.save_profile(profile).await {
            warn!(user_id = %profile.id, error = %e, "local profile save failed");
        }
        if let Err(e) = self.remote.profiles.save_profile(profile).await {
            warn!(user_id = %profile.id, error = %e, "remote profile save failed");
        }
    }

    fn emit_notice(&self, notice: Notice, at: DateTime<Utc>) {
        let _ = self.events.send(Event::Notice { notice, at });
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        if let Some(handle) = self.listener.take() {
            handle.abort();
        }
    }
}

async fn run_ticker(persister: Arc<PeriodicPersister>, activity: ActivityReader, period: std::time::Duration) {
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tick.tick().await;
        persister.tick(activity.seconds_today(), Utc::now()).await;
    }
}

async fn listen(
    mut subscription: ProfileSubscription,
    profile: Arc<ProfileState>,
    cache: LocalCache,
    events: broadcast::Sender<Event>,
) {
    while let Some(snapshot) = subscription.next().await {
        let Some(merged) = profile.apply_remote(&snapshot) else {
            continue;
        };
        if let Err(e) = cache.save_profile(&merged).await {
            warn!(user_id = %merged.id, error = %e, "local save of synced profile failed");
        }
        info!(user_id = %merged.id, credits = merged.credits, "profile synced from remote");
        let _ = events.send(Event::ProfileSynced {
            user_id: merged.id.clone(),
            credits: merged.credits,
            at: Utc::now(),
        });
    }
    debug!(user_id = %subscription.user_id(), "remote subscription ended");
}
