//! Seams to the realtime document store.
//!
//! The store itself is an external collaborator; these traits describe the
//! three things the dashboard needs from it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::RemoteError;
use crate::profile::UserProfile;

/// A user document as delivered by the store: a JSON object.
pub type RemoteDocument = serde_json::Map<String, serde_json::Value>;

/// Live feed of one user's document. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ProfileSubscription {
    user_id: String,
    rx: mpsc::UnboundedReceiver<RemoteDocument>,
}

impl ProfileSubscription {
    pub fn new(user_id: impl Into<String>, rx: mpsc::UnboundedReceiver<RemoteDocument>) -> Self {
        Self {
            user_id: user_id.into(),
            rx,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Next snapshot, or `None` once the channel is gone.
    pub async fn next(&mut self) -> Option<RemoteDocument> {
        self.rx.recv().await
    }
}

/// Delivers the full document on every remote change, own writes included.
#[async_trait]
pub trait RemoteProfileChannel: Send + Sync {
    async fn subscribe(&self, user_id: &str) -> Result<ProfileSubscription, RemoteError>;
}

/// Best-effort "last seen / time studied" status record.
#[async_trait]
pub trait RemoteStatusWriter: Send + Sync {
    async fn update_status(&self, user_id: &str, seconds_today: u64) -> Result<(), RemoteError>;
}

/// Best-effort write of the whole profile document.
#[async_trait]
pub trait RemoteProfileWriter: Send + Sync {
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), RemoteError>;
}

/// The remote collaborators a session talks to.
#[derive(Clone)]
pub struct RemoteHandles {
    pub channel: Arc<dyn RemoteProfileChannel>,
    pub status: Arc<dyn RemoteStatusWriter>,
    pub profiles: Arc<dyn RemoteProfileWriter>,
}

impl RemoteHandles {
    /// All three roles served by one backend.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RemoteProfileChannel + RemoteStatusWriter + RemoteProfileWriter + 'static,
    {
        Self {
            channel: backend.clone(),
            status: backend.clone(),
            profiles: backend,
        }
    }
}
