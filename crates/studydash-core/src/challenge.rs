//! Timed challenges published for a class.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RemoteError, Result};
use crate::storage::keys::ChallengeStartedKey;
use crate::storage::LocalCache;

pub const DAILY_DURATION_MINUTES: u32 = 15;
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeKind {
    DailyChallenge,
    WeeklyChallenge,
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    pub class_level: String,
    #[serde(default)]
    pub questions: Vec<QuestionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// A challenge turned into something the test runner can execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub class_level: String,
    pub questions: Vec<QuestionItem>,
    pub total_questions: usize,
    pub passing_score: usize,
    pub duration_minutes: u32,
    pub auto_submit_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Challenge {
    pub fn to_test_plan(&self) -> TestPlan {
        let total = self.questions.len();
        let duration = self.duration_minutes.filter(|m| *m > 0).unwrap_or(match self.kind {
            ChallengeKind::DailyChallenge => DAILY_DURATION_MINUTES,
            ChallengeKind::WeeklyChallenge | ChallengeKind::Event => DEFAULT_DURATION_MINUTES,
        });
        TestPlan {
            id: self.id.clone(),
            name: self.title.clone(),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| "2.0 Challenge".to_string()),
            class_level: self.class_level.clone(),
            questions: self.questions.clone(),
            total_questions: total,
            // half the questions, rounded up
            passing_score: total.div_ceil(2),
            duration_minutes: duration,
            auto_submit_enabled: true,
            created_at: self.created_at,
        }
    }
}

/// Where active challenges come from.
#[async_trait]
pub trait ChallengeSource: Send + Sync {
    async fn active_challenges(&self, class_level: &str) -> Result<Vec<Challenge>, RemoteError>;
}

/// Active challenges for a class. An empty class level has none.
pub async fn load_active(source: &dyn ChallengeSource, class_level: Option<&str>) -> Result<Vec<Challenge>> {
    let Some(class_level) = class_level.filter(|c| !c.is_empty()) else {
        return Ok(Vec::new());
    };
    let mut challenges = source.active_challenges(class_level).await?;
    challenges.retain(|c| c.is_active);
    debug!(class_level, count = challenges.len(), "active challenges loaded");
    Ok(challenges)
}

/// Record that `user_id` started `challenge` and return its test plan.
pub async fn start_challenge(
    cache: &LocalCache,
    user_id: &str,
    challenge: &Challenge,
    now: DateTime<Utc>,
) -> Result<TestPlan> {
    let key = ChallengeStartedKey {
        user_id,
        challenge_id: &challenge.id,
    };
    if cache.load(&key).await?.is_none() {
        cache.save(&key, &now).await?;
    }
    info!(user_id, challenge_id = %challenge.id, "challenge started");
    Ok(challenge.to_test_plan())
}

/// When `user_id` first started the challenge, if ever.
pub async fn started_at(cache: &LocalCache, user_id: &str, challenge_id: &str) -> Result<Option<DateTime<Utc>>> {
    cache
        .load(&ChallengeStartedKey {
            user_id,
            challenge_id,
        })
        .await
}
