//! Daily quota for AI generated study notes.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{RemoteError, Result};
use crate::notice::Notice;
use crate::profile::{SubscriptionLevel, UserProfile};
use crate::storage::keys::AiUsageKey;
use crate::storage::{AiLimitsConfig, LocalCache};

/// Produces notes for a topic. Backed by a hosted model in production.
#[async_trait]
pub trait NotesGenerator: Send + Sync {
    async fn generate(&self, topic: &str) -> Result<String, RemoteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotesOutcome {
    Generated { notes: String, used: u32, limit: u32 },
    Refused(Notice),
}

/// Generations allowed per day for this profile.
pub fn daily_limit(profile: &UserProfile, limits: &AiLimitsConfig) -> u32 {
    match profile.effective_level() {
        Some(SubscriptionLevel::Basic) => limits.basic,
        Some(SubscriptionLevel::Ultra) => limits.ultra,
        None => limits.free,
    }
}

pub async fn usage_on(cache: &LocalCache, user_id: &str, day: NaiveDate) -> Result<u32> {
    Ok(cache.load(&AiUsageKey { user_id, day }).await?.unwrap_or(0))
}

/// Generate notes for `topic` if today's quota allows it. The usage counter
/// only moves when generation succeeds.
pub async fn generate_notes(
    cache: &LocalCache,
    generator: &dyn NotesGenerator,
    profile: &UserProfile,
    limits: &AiLimitsConfig,
    topic: &str,
    today: NaiveDate,
) -> Result<NotesOutcome> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Ok(NotesOutcome::Refused(Notice::error("Please enter a topic!")));
    }

    let used = usage_on(cache, &profile.id, today).await?;
    let limit = daily_limit(profile, limits);
    if used >= limit {
        return Ok(NotesOutcome::Refused(Notice::error(format!(
            "Daily Limit Reached! Used {used}/{limit} generations."
        ))));
    }

    let notes = match generator.generate(topic).await {
        Ok(notes) => notes,
        Err(e) => {
            warn!(user_id = %profile.id, error = %e, "notes generation failed");
            return Ok(NotesOutcome::Refused(Notice::error(
                "Failed to generate notes. Please try again.",
            )));
        }
    };

    let used = used + 1;
    cache
        .save(
            &AiUsageKey {
                user_id: &profile.id,
                day: today,
            },
            &used,
        )
        .await?;
    info!(user_id = %profile.id, used, limit, "notes generated");
    Ok(NotesOutcome::Generated { notes, used, limit })
}
