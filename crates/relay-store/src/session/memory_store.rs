//! In-memory session storage.

use super::{SessionState, SessionStore};
use crate::error::StoreResult;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Session store kept in process memory
///
/// Records do not survive a restart. Also counts saves so callers can observe
/// write-through behaviour.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: Mutex<HashMap<String, SessionState>>,
    saves: Mutex<usize>,
}

impl MemorySessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one record
    #[must_use]
    pub fn with_record(credential: impl Into<String>, state: SessionState) -> Self {
        let store = Self::default();
        store.records.lock().insert(credential.into(), state);
        store
    }

    /// Current record for a credential, if any was saved
    #[must_use]
    pub fn get(&self, credential: &str) -> Option<SessionState> {
        self.records.lock().get(credential).cloned()
    }

    /// Number of successful saves
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, credential: &str) -> SessionState {
        self.get(credential).unwrap_or_default()
    }

    async fn save(&self, credential: &str, state: &SessionState) -> StoreResult<()> {
        self.records
            .lock()
            .insert(credential.to_string(), state.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}
