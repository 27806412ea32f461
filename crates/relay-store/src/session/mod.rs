//! Session state storage.
//!
//! Provides the [`SessionStore`] port and its implementations:
//! - File-backed storage (one JSON record per credential)
//! - In-memory storage

mod file_store;
mod memory_store;
mod state;

pub use file_store::FileSessionStore;
pub use memory_store::MemorySessionStore;
pub use state::SessionState;

use crate::error::StoreResult;
use async_trait::async_trait;

/// Storage for resumable session state, keyed by credential
///
/// A store has exactly one writer per credential, so implementations need no
/// cross-process coordination.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the record for a credential
    ///
    /// Never fails: missing or unreadable records yield an empty state.
    async fn load(&self, credential: &str) -> SessionState;

    /// Overwrite the record for a credential
    async fn save(&self, credential: &str, state: &SessionState) -> StoreResult<()>;
}
