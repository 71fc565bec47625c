//! In-process document store.
//!
//! Serves the CLI's session simulation and the tests. Admin edits are modelled
//! by [`InMemoryRemote::patch_document`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::remote::{
    ProfileSubscription, RemoteDocument, RemoteProfileChannel, RemoteProfileWriter,
    RemoteStatusWriter,
};
use crate::error::RemoteError;
use crate::profile::UserProfile;

/// Last status written for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub seconds_today: u64,
    pub last_seen: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryRemote {
    documents: Mutex<HashMap<String, RemoteDocument>>,
    statuses: Mutex<HashMap<String, StatusRecord>>,
    subscribers: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<RemoteDocument>>>>,
    offline: AtomicBool,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every write fails with [`RemoteError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn document(&self, user_id: &str) -> Option<RemoteDocument> {
        self.documents.lock().ok()?.get(user_id).cloned()
    }

    pub fn status(&self, user_id: &str) -> Option<StatusRecord> {
        self.statuses.lock().ok()?.get(user_id).cloned()
    }

    /// Number of live subscriptions for a user.
    pub fn subscriber_count(&self, user_id: &str) -> usize {
        let Ok(mut subs) = self.subscribers.lock() else {
            return 0;
        };
        match subs.get_mut(user_id) {
            Some(list) => {
                list.retain(|tx| !tx.is_closed());
                list.len()
            }
            None => 0,
        }
    }

    /// Shallow-merge `fields` into the stored document and notify subscribers,
    /// the way an admin console edit would.
    pub fn patch_document(&self, user_id: &str, fields: RemoteDocument) -> Result<(), RemoteError> {
        self.ensure_online()?;
        let doc = {
            let mut docs = self.documents.lock().map_err(|_| poisoned())?;
            let doc = docs.entry(user_id.to_string()).or_default();
            for (k, v) in fields {
                doc.insert(k, v);
            }
            doc.clone()
        };
        self.broadcast(user_id, doc);
        Ok(())
    }

    /// Overwrite the stored document and notify subscribers. Keys missing
    /// from `doc` are gone from the store afterwards.
    pub fn replace_document(&self, user_id: &str, doc: RemoteDocument) -> Result<(), RemoteError> {
        self.ensure_online()?;
        self.documents
            .lock()
            .map_err(|_| poisoned())?
            .insert(user_id.to_string(), doc.clone());
        self.broadcast(user_id, doc);
        Ok(())
    }

    fn ensure_online(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RemoteError::Unavailable("in-memory remote is offline".into()))
        } else {
            Ok(())
        }
    }

    fn broadcast(&self, user_id: &str, doc: RemoteDocument) {
        let Ok(mut subs) = self.subscribers.lock() else {
            return;
        };
        if let Some(list) = subs.get_mut(user_id) {
            list.retain(|tx| tx.send(doc.clone()).is_ok());
        }
    }
}

fn poisoned() -> RemoteError {
    RemoteError::Unavailable("in-memory remote lock poisoned".into())
}

#[async_trait]
impl RemoteProfileChannel for InMemoryRemote {
    async fn subscribe(&self, user_id: &str) -> Result<ProfileSubscription, RemoteError> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(doc) = self.document(user_id) {
            let _ = tx.send(doc);
        }
        self.subscribers
            .lock()
            .map_err(|_| poisoned())?
            .entry(user_id.to_string())
            .or_default()
            .push(tx);
        Ok(ProfileSubscription::new(user_id, rx))
    }
}

#[async_trait]
impl RemoteStatusWriter for InMemoryRemote {
    async fn update_status(&self, user_id: &str, seconds_today: u64) -> Result<(), RemoteError> {
        self.ensure_online()?;
        self.statuses.lock().map_err(|_| poisoned())?.insert(
            user_id.to_string(),
            StatusRecord {
                seconds_today,
                last_seen: Utc::now(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl RemoteProfileWriter for InMemoryRemote {
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), RemoteError> {
        self.ensure_online()?;
        let doc = match serde_json::to_value(profile) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(RemoteError::Rejected {
                    user_id: profile.id.clone(),
                    message: "profile is not a JSON object".into(),
                })
            }
        };
        self.documents
            .lock()
            .map_err(|_| poisoned())?
            .insert(profile.id.clone(), doc.clone());
        self.broadcast(&profile.id, doc);
        Ok(())
    }
}
