//! The working copy of the signed-in user's profile.

use tokio::sync::watch;
use tracing::debug;

use super::merger::{merge_remote, MergeDecision};
use super::remote::RemoteDocument;
use crate::profile::UserProfile;

/// Shared, observable working copy.
///
/// Observers are notified only when the profile actually changes, so a
/// snapshot that matches on every synced field produces no notification.
#[derive(Debug)]
pub struct ProfileState {
    tx: watch::Sender<UserProfile>,
}

impl ProfileState {
    pub fn new(profile: UserProfile) -> Self {
        let (tx, _rx) = watch::channel(profile);
        Self { tx }
    }

    pub fn current(&self) -> UserProfile {
        self.tx.borrow().clone()
    }

    pub fn user_id(&self) -> String {
        self.tx.borrow().id.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UserProfile> {
        self.tx.subscribe()
    }

    /// Apply a remote snapshot. Returns the new profile when it replaced the working copy.
    pub fn apply_remote(&self, snapshot: &RemoteDocument) -> Option<UserProfile> {
        let mut replaced = None;
        self.tx.send_if_modified(|current| match merge_remote(current, snapshot) {
            MergeDecision::Keep => {
                debug!(user_id = %current.id, "remote snapshot matches synced fields");
                false
            }
            MergeDecision::Replace(merged) if merged == *current => false,
            MergeDecision::Replace(merged) => {
                *current = merged.clone();
                replaced = Some(merged);
                true
            }
        });
        replaced
    }

    /// Replace the working copy after a local write.
    pub fn replace(&self, profile: UserProfile) {
        self.tx.send_replace(profile);
    }

    /// Apply `f` to the working copy atomically. `f` returns `None` to leave it untouched.
    pub fn update<F>(&self, f: F) -> Option<UserProfile>
    where
        F: FnOnce(&UserProfile) -> Option<UserProfile>,
    {
        let mut result = None;
        self.tx.send_if_modified(|current| match f(current) {
            Some(next) => {
                *current = next.clone();
                result = Some(next);
                true
            }
            None => false,
        });
        result
    }

    /// Decide against the working copy and store the profile the decision
    /// hands back, if any. When the working copy moves between the read and
    /// the write, the decision is made again on the newer copy.
    pub fn update_with<T, F>(&self, f: F) -> (T, Option<UserProfile>)
    where
        F: Fn(&UserProfile) -> (T, Option<UserProfile>),
    {
        loop {
            let seen = self.current();
            let (verdict, next) = f(&seen);
            let Some(next) = next else {
                return (verdict, None);
            };
            let stored = self.tx.send_if_modified(|current| {
                if *current != seen {
                    return false;
                }
                *current = next.clone();
                true
            });
            if stored {
                return (verdict, Some(next));
            }
            debug!(user_id = %seen.id, "working copy moved during update; deciding again");
        }
    }
}
