//! # relay-store
//!
//! Durable storage for gateway session state.
//!
//! ## Features
//!
//! - **Session State**: the resumability record (session id, last sequence)
//! - **File Store**: one JSON document per bot credential, best-effort reads
//! - **Memory Store**: in-process store for tests and ephemeral runs
//!
//! ## Example
//!
//! ```ignore
//! use relay_store::{FileSessionStore, SessionStore};
//!
//! let store = FileSessionStore::new(Some("./state".into()));
//!
//! // Missing or corrupt records load as an empty state
//! let mut state = store.load(&token).await;
//!
//! state.record_sequence(Some(42));
//! store.save(&token, &state).await?;
//! ```

pub mod error;
pub mod session;

pub use error::{StoreError, StoreResult};
pub use session::{FileSessionStore, MemorySessionStore, SessionState, SessionStore};
