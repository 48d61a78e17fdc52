use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::PersistenceSlot;
use crate::models::{StorageError, StorageResult};

/// Persistence slot stored as one file inside a directory.
///
/// The file name is derived from the key; characters outside
/// `[A-Za-z0-9_-]` become `_`. Writes go to a temporary sibling first and are
/// renamed into place, so a crash never leaves a half-written cart.
#[derive(Debug, Clone)]
pub struct FilePersistenceSlot {
    key: String,
    path: PathBuf,
}

impl FilePersistenceSlot {
    pub fn new(dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        let key = key.into();
        let path = dir.as_ref().join(file_name_for_key(&key));
        Self { key, path }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: self.key.clone(),
            source,
        }
    }
}

fn file_name_for_key(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.json")
}

#[async_trait]
impl PersistenceSlot for FilePersistenceSlot {
    fn key(&self) -> &str {
        &self.key
    }

    #[instrument(skip(self), fields(key = %self.key))]
    async fn load(&self) -> StorageResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(value) => {
                debug!(bytes = value.len(), "Slot loaded");
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Slot is empty");
                Ok(None)
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    #[instrument(skip(self, value), fields(key = %self.key, bytes = value.len()))]
    async fn store(&self, value: &str) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, value)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!("Slot stored");
        Ok(())
    }
}

/// Persistence slot held in memory, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct InMemoryPersistenceSlot {
    key: String,
    value: RwLock<Option<String>>,
}

impl InMemoryPersistenceSlot {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: RwLock::new(None),
        }
    }

    /// Slot pre-filled with a stored value
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: RwLock::new(Some(value.into())),
        }
    }

    /// Current value, without going through the trait
    pub async fn snapshot(&self) -> Option<String> {
        self.value.read().await.clone()
    }
}

#[async_trait]
impl PersistenceSlot for InMemoryPersistenceSlot {
    fn key(&self) -> &str {
        &self.key
    }

    async fn load(&self) -> StorageResult<Option<String>> {
        Ok(self.value.read().await.clone())
    }

    async fn store(&self, value: &str) -> StorageResult<()> {
        *self.value.write().await = Some(value.to_string());
        Ok(())
    }
}
