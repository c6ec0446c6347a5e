//! JSON file-backed snapshot store with atomic writes.

use std::path::{Path, PathBuf};

use {
    async_trait::async_trait,
    tokio::fs,
    tracing::{debug, warn},
};

use threadscribe_common::{Error, Result};

use crate::{store::SnapshotStore, types::LedgerSnapshot};

/// File-backed store. The full snapshot lives in a single JSON file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomic write: write to temp, rename over target, keep `.bak`.
    async fn atomic_write(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::persistence(&self.path, e))?;
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| Error::persistence(&self.path, e))?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| Error::persistence(&self.path, e))?;

        // Keep the previous snapshot around until the new one is in place.
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            let bak = self.path.with_extension("json.bak");
            let _ = fs::rename(&self.path, &bak).await;
        }

        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::persistence(&self.path, e))?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    /// Missing, unreadable, or malformed files all yield an empty snapshot;
    /// the caller starts fresh instead of failing.
    async fn load(&self) -> Result<LedgerSnapshot> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            debug!(path = %self.path.display(), "no existing snapshot, starting fresh");
            return Ok(LedgerSnapshot::empty());
        }

        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot unreadable, starting fresh");
                return Ok(LedgerSnapshot::empty());
            },
        };

        match serde_json::from_str(&data) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot malformed, starting fresh");
                Ok(LedgerSnapshot::empty())
            },
        }
    }

    async fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        self.atomic_write(snapshot).await
    }
}
