//! Whole-session snapshots.
//!
//! The session is saved as a single JSON document after every mutating
//! operation and restored wholesale on startup. There is no partial update.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use super::{StorageConfig, StorageError};
use crate::models::Session;

/// Reads and writes the session snapshot file.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the configured snapshot location.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.snapshot_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the whole session, replacing any previous snapshot.
    ///
    /// Writes to a sibling temp file first so a crash never leaves a
    /// half-written snapshot behind.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(
            "Saved session snapshot ({} matches) to {:?}",
            session.match_counter(),
            self.path
        );
        Ok(())
    }

    /// Restore the saved session, or `None` if nothing has been saved.
    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let session: Session =
            serde_json::from_str(&contents).map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        session
            .check_invariants()
            .map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        debug!("Loaded session snapshot from {:?}", self.path);
        Ok(Some(session))
    }

    /// Remove the snapshot. Succeeds if there is none.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed session snapshot {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
