mod inbox;
mod types;

pub use inbox::{mark_all_read, unread_count};
pub use types::{InboxMessage, MessageKind, SubscriptionLevel, SubscriptionTier, UserProfile};
