//! File-backed session storage.
//!
//! One JSON document per credential. The file name is derived from the
//! credential so a restarted process finds the same record.

use super::{SessionState, SessionStore};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File name prefix used when records live in the system temp directory
const TEMP_FILE_PREFIX: &str = "gateway-relay-";
/// Extension of record files
const RECORD_EXTENSION: &str = "json";

/// Session store writing one JSON file per credential
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    /// Directory holding the records
    dir: PathBuf,
    /// Prefix prepended to every file name
    prefix: &'static str,
}

impl FileSessionStore {
    /// Create a store
    ///
    /// With a state directory, records are written as `{dir}/{credential}.json`
    /// and the directory is created on the first save. Without one they go to
    /// `{tmp}/gateway-relay-{credential}.json`.
    #[must_use]
    pub fn new(state_dir: Option<PathBuf>) -> Self {
        match state_dir {
            Some(dir) => Self { dir, prefix: "" },
            None => Self {
                dir: std::env::temp_dir(),
                prefix: TEMP_FILE_PREFIX,
            },
        }
    }

    /// Directory holding the records
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for a credential
    #[must_use]
    pub fn path_for(&self, credential: &str) -> PathBuf {
        let file_name = format!(
            "{}{}.{RECORD_EXTENSION}",
            self.prefix,
            sanitize_file_stem(credential)
        );
        self.dir.join(file_name)
    }
}

/// Replace characters that would escape the directory or break the file name
fn sanitize_file_stem(credential: &str) -> String {
    credential
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, credential: &str) -> SessionState {
        let path = self.path_for(credential);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No session record, starting fresh");
                return SessionState::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read session record");
                return SessionState::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Corrupt session record, starting fresh"
                );
                SessionState::default()
            }
        }
    }

    async fn save(&self, credential: &str, state: &SessionState) -> StoreResult<()> {
        let path = self.path_for(credential);
        let json = serde_json::to_vec(state)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        // Whole-record overwrite: write a sibling file, then rename over the record
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        tracing::trace!(
            path = %path.display(),
            session_id = ?state.session_id,
            seq = ?state.seq,
            "Session record saved"
        );

        Ok(())
    }
}
