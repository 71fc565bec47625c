//! Inbox bookkeeping. Messages arrive by remote push; locally they can only be marked read.

use super::types::UserProfile;

pub fn unread_count(profile: &UserProfile) -> usize {
    profile.inbox.iter().filter(|m| !m.read).count()
}

/// Returns the profile with every message marked read, or `None` when there
/// is nothing to change.
pub fn mark_all_read(profile: &UserProfile) -> Option<UserProfile> {
    if unread_count(profile) == 0 {
        return None;
    }
    let mut updated = profile.clone();
    for message in &mut updated.inbox {
        message.read = true;
    }
    Some(updated)
}
