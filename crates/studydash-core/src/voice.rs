//! Spoken audio guide.
//!
//! Speech synthesis is platform specific and lives behind [`SpeechOutput`].
//! This module decides whether to speak, what to say and with which voice.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::keys::{AudioGuideEnabledKey, PreferredVoiceKey, VoiceScriptsKey};
use crate::storage::LocalCache;

pub const STUDENT_WELCOME: &str = "STUDENT_WELCOME";
pub const ADMIN_WELCOME: &str = "ADMIN_WELCOME";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub uri: String,
    pub name: String,
    pub lang: String,
}

impl VoiceInfo {
    fn is_indian(&self) -> bool {
        let name = self.name.to_lowercase();
        self.lang == "hi-IN" || self.lang == "en-IN" || name.contains("india") || name.contains("hindi")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAudience {
    Student,
    Admin,
}

#[async_trait]
pub trait SpeechOutput: Send + Sync {
    fn voices(&self) -> Vec<VoiceInfo>;
    async fn speak(&self, text: &str, voice: Option<&VoiceInfo>);
}

/// Voices tagged Hindi or Indian English, in platform order.
pub fn indian_voices(voices: &[VoiceInfo]) -> Vec<&VoiceInfo> {
    voices.iter().filter(|v| v.is_indian()).collect()
}

/// Pick the voice to speak with. A stored preference that no longer matches
/// any voice yields `None` so the platform default is used.
pub fn preferred_voice<'a>(voices: &'a [VoiceInfo], stored_uri: Option<&str>) -> Option<&'a VoiceInfo> {
    if let Some(uri) = stored_uri {
        return voices.iter().find(|v| v.uri == uri);
    }
    indian_voices(voices).into_iter().next().or_else(|| voices.first())
}

pub fn welcome_text(audience: GuideAudience, name: &str, scripts: &HashMap<String, String>) -> String {
    let (key, default) = match audience {
        GuideAudience::Student => (STUDENT_WELCOME, format!("Welcome {name}. Ready to learn something new today?")),
        GuideAudience::Admin => (ADMIN_WELCOME, format!("Welcome back, Admin {name}. System is ready.")),
    };
    let message = scripts
        .get(key)
        .filter(|s| !s.is_empty())
        .cloned()
        .unwrap_or(default);
    message.replacen("{name}", name, 1)
}

/// Locally stored voice guide settings.
pub struct VoiceGuide {
    cache: LocalCache,
}

impl VoiceGuide {
    pub fn new(cache: LocalCache) -> Self {
        Self { cache }
    }

    /// On unless the user switched it off.
    pub async fn is_enabled(&self) -> Result<bool> {
        Ok(self.cache.load(&AudioGuideEnabledKey).await?.unwrap_or(true))
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.cache.save(&AudioGuideEnabledKey, &enabled).await
    }

    pub async fn set_preferred_voice(&self, uri: &str) -> Result<()> {
        self.cache.save(&PreferredVoiceKey, &uri.to_string()).await
    }

    pub async fn scripts(&self) -> Result<HashMap<String, String>> {
        Ok(self.cache.load(&VoiceScriptsKey).await?.unwrap_or_default())
    }

    pub async fn set_scripts(&self, scripts: &HashMap<String, String>) -> Result<()> {
        self.cache.save(&VoiceScriptsKey, scripts).await
    }

    /// Speak the guide text for `key`, preferring an admin override script.
    /// Returns the text spoken, or `None` when the guide is off.
    pub async fn play_guide(&self, out: &dyn SpeechOutput, key: &str, default_text: &str) -> Result<Option<String>> {
        if !self.is_enabled().await? {
            return Ok(None);
        }
        let text = self
            .scripts()
            .await?
            .get(key)
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| default_text.to_string());
        self.speak(out, &text).await?;
        Ok(Some(text))
    }

    pub async fn play_welcome(&self, out: &dyn SpeechOutput, audience: GuideAudience, name: &str) -> Result<Option<String>> {
        if !self.is_enabled().await? {
            return Ok(None);
        }
        let text = welcome_text(audience, name, &self.scripts().await?);
        self.speak(out, &text).await?;
        Ok(Some(text))
    }

    async fn speak(&self, out: &dyn SpeechOutput, text: &str) -> Result<()> {
        let stored = self.cache.load(&PreferredVoiceKey).await?;
        let voices = out.voices();
        out.speak(text, preferred_voice(&voices, stored.as_deref())).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::{Arc, Mutex};

    fn voice(uri: &str, name: &str, lang: &str) -> VoiceInfo {
        VoiceInfo {
            uri: uri.into(),
            name: name.into(),
            lang: lang.into(),
        }
    }

    #[derive(Default)]
    struct Recorder {
        spoken: Mutex<Vec<(String, Option<String>)>>,
    }

    #[async_trait]
    impl SpeechOutput for Recorder {
        fn voices(&self) -> Vec<VoiceInfo> {
            vec![voice("v-us", "Samantha", "en-US"), voice("v-in", "Google Hindi", "hi-IN")]
        }

        async fn speak(&self, text: &str, voice: Option<&VoiceInfo>) {
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_string(), voice.map(|v| v.uri.clone())));
        }
    }

    #[test]
    fn prefers_indian_voice_then_first() {
        let voices = vec![
            voice("a", "Alex", "en-US"),
            voice("b", "Veena (India)", "en-GB"),
            voice("c", "Lekha", "hi-IN"),
        ];
        assert_eq!(preferred_voice(&voices, None).unwrap().uri, "b");
        assert_eq!(preferred_voice(&voices[..1], None).unwrap().uri, "a");
        assert_eq!(preferred_voice(&voices, Some("c")).unwrap().uri, "c");
        assert!(preferred_voice(&voices, Some("gone")).is_none());
        assert!(preferred_voice(&[], None).is_none());
    }

    #[test]
    fn welcome_uses_override_with_name() {
        let mut scripts = HashMap::new();
        assert_eq!(
            welcome_text(GuideAudience::Student, "Asha", &scripts),
            "Welcome Asha. Ready to learn something new today?"
        );
        assert_eq!(
            welcome_text(GuideAudience::Admin, "Ravi", &scripts),
            "Welcome back, Admin Ravi. System is ready."
        );
        scripts.insert(STUDENT_WELCOME.to_string(), "Namaste {name}!".to_string());
        assert_eq!(welcome_text(GuideAudience::Student, "Asha", &scripts), "Namaste Asha!");
    }

    #[tokio::test]
    async fn guide_respects_toggle_and_overrides() {
        let guide = VoiceGuide::new(LocalCache::new(Arc::new(MemoryStore::new())));
        let out = Recorder::default();
        assert!(guide.is_enabled().await.unwrap());

        let mut scripts = HashMap::new();
        scripts.insert("TIMER".to_string(), "Timer started".to_string());
        guide.set_scripts(&scripts).await.unwrap();

        let spoken = guide.play_guide(&out, "TIMER", "Start your timer").await.unwrap();
        assert_eq!(spoken.as_deref(), Some("Timer started"));
        assert_eq!(out.spoken.lock().unwrap()[0].1.as_deref(), Some("v-in"));

        guide.set_enabled(false).await.unwrap();
        assert_eq!(guide.play_guide(&out, "TIMER", "x").await.unwrap(), None);
        assert_eq!(out.spoken.lock().unwrap().len(), 1);
    }
}
