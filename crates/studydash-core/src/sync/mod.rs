//! Local/remote profile synchronization.
//!
//! The remote document store pushes snapshots; the merger decides whether a
//! snapshot replaces the local working copy.

mod memory;
mod merger;
mod remote;
mod state;

pub use memory::{InMemoryRemote, StatusRecord};
pub use merger::{diverged_fields, merge_remote, MergeDecision, SYNCED_FIELDS};
pub use remote::{
    ProfileSubscription, RemoteDocument, RemoteHandles, RemoteProfileChannel, RemoteProfileWriter,
    RemoteStatusWriter,
};
pub use state::ProfileState;
