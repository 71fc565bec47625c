//! # StudyDash Core Library
//!
//! Core logic of the student learning dashboard: daily study goals, the daily
//! reward, profile synchronization with a realtime document store, periodic
//! persistence of study time, and a typed local cache. The `studydash` CLI is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Reward evaluator**: pure eligibility check for the once-a-day reward
//! - **State merger**: decides when a pushed remote snapshot replaces the
//!   local working copy
//! - **Periodic persister**: writes seconds studied today on every tick and
//!   grants the first-day bonus
//! - **Storage**: typed keys over a key-value store (SQLite or in-memory) and
//!   TOML configuration
//!
//! ## Key Components
//!
//! - [`DashboardSession`]: owns the background tasks for a signed-in user
//! - [`LocalCache`]: typed access to the local key-value store
//! - [`Config`]: application configuration management
//! - [`RemoteHandles`]: the remote document store seams

pub mod activity;
pub mod ai_notes;
pub mod calendar;
pub mod challenge;
pub mod economy;
pub mod error;
pub mod events;
pub mod goal;
pub mod notice;
pub mod persister;
pub mod profile;
pub mod prompts;
pub mod reward;
pub mod session;
pub mod storage;
pub mod sync;
pub mod voice;

pub use activity::{activity_channel, ActivityFeed, ActivityReader};
pub use error::{ConfigError, CoreError, RemoteError, StorageError, ValidationError};
pub use events::Event;
pub use goal::DailyGoal;
pub use notice::{Notice, NoticeLevel};
pub use persister::{PeriodicPersister, TickReport};
pub use profile::{InboxMessage, MessageKind, SubscriptionLevel, SubscriptionTier, UserProfile};
pub use reward::{can_claim, ClaimOutcome, RewardClaimState};
pub use session::DashboardSession;
pub use storage::{Config, LocalCache, LocalStore, MemoryStore, SqliteStore};
pub use sync::{InMemoryRemote, MergeDecision, ProfileState, RemoteHandles};
