//! Local key-value store and the typed cache built on top of it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::warn;

use super::keys::{CurrentUserKey, StorageKey, UsersKey};
use crate::error::{Result, StorageError};
use crate::profile::UserProfile;

/// Async string key/value store holding JSON-encoded values.
///
/// Writes are last-write-wins per key; nothing locks across keys.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    async fn set_raw(&self, key: &str, value: String) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Typed access to a [`LocalStore`].
///
/// Values that fail to decode are treated as absent: the cache has no way to
/// repair partial corruption, so it fails closed.
#[derive(Clone)]
pub struct LocalCache {
    store: Arc<dyn LocalStore>,
}

impl LocalCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }

    /// Read a typed value. I/O failures are errors, corrupt JSON is `None`.
    pub async fn load<K: StorageKey + Sync>(&self, key: &K) -> Result<Option<K::Value>> {
        let name = key.key();
        let Some(raw) = self.store.get_raw(&name).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %name, error = %e, "discarding unreadable cached value");
                Ok(None)
            }
        }
    }

    pub async fn save<K: StorageKey + Sync>(&self, key: &K, value: &K::Value) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set_raw(&key.key(), raw).await
    }

    pub async fn clear<K: StorageKey + Sync>(&self, key: &K) -> Result<()> {
        self.store.remove(&key.key()).await
    }

    pub async fn current_user(&self) -> Result<Option<UserProfile>> {
        self.load(&CurrentUserKey).await
    }

    /// Persist a profile as the current user and refresh its entry in the
    /// device's user list when it is listed there.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let mut users = self.load(&UsersKey).await?.unwrap_or_default();
        if let Some(slot) = users.iter_mut().find(|u| u.id == profile.id) {
            *slot = profile.clone();
            self.save(&UsersKey, &users).await?;
        }
        self.save(&CurrentUserKey, profile).await
    }

    /// Add a profile to the device's user list, replacing any entry with the same id.
    pub async fn register_user(&self, profile: &UserProfile) -> Result<()> {
        let mut users = self.load(&UsersKey).await?.unwrap_or_default();
        users.retain(|u| u.id != profile.id);
        users.push(profile.clone());
        self.save(&UsersKey, &users).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::DailyGoal;
    use crate::storage::keys::{DailyGoalKey, FirstDayBonusKey};

    fn cache() -> (Arc<MemoryStore>, LocalCache) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), LocalCache::new(store))
    }

    #[tokio::test]
    async fn typed_roundtrip() {
        let (_, cache) = cache();
        let key = DailyGoalKey { user_id: "u1" };
        assert!(cache.load(&key).await.unwrap().is_none());
        cache.save(&key, &DailyGoal::from_secs(7200)).await.unwrap();
        assert_eq!(cache.load(&key).await.unwrap(), Some(DailyGoal::from_secs(7200)));
    }

    #[tokio::test]
    async fn corrupt_value_reads_as_absent() {
        let (store, cache) = cache();
        let key = FirstDayBonusKey { user_id: "u1" };
        store.set_raw(&key.key(), "{not json".into()).await.unwrap();
        assert_eq!(cache.load(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_removes_value() {
        let (store, cache) = cache();
        let key = FirstDayBonusKey { user_id: "u1" };
        cache.save(&key, &true).await.unwrap();
        cache.clear(&key).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn save_profile_updates_listed_user() {
        let (_, cache) = cache();
        let mut profile = UserProfile::new("u1", "A", "a@x");
        cache.register_user(&profile).await.unwrap();
        cache
            .register_user(&UserProfile::new("u2", "B", "b@x"))
            .await
            .unwrap();

        profile.credits = 42;
        cache.save_profile(&profile).await.unwrap();

        let users = cache.load(&UsersKey).await.unwrap().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users.iter().find(|u| u.id == "u1").unwrap().credits, 42);
        assert_eq!(cache.current_user().await.unwrap().unwrap().credits, 42);
    }

    #[tokio::test]
    async fn save_profile_leaves_unlisted_user_out_of_list() {
        let (_, cache) = cache();
        let profile = UserProfile::new("u9", "Z", "z@x");
        cache.save_profile(&profile).await.unwrap();
        assert!(cache.load(&UsersKey).await.unwrap().is_none());
        assert_eq!(cache.current_user().await.unwrap().unwrap().id, "u9");
    }
}
