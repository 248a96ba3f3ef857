//! JSON file collection store
//!
//! Backs a collection with one `.json` file holding either a bare array of
//! records or a `{ "message", "items" }` envelope. Writes go through a sibling
//! temporary file and a rename so readers never see a half-written file.
//! Writes through one store (and its clones) are serialized, and each one
//! re-reads the file before another may start.

use crate::error::StoreError;
use crate::store::{Collection, CollectionStore, StoredCollection};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Check if `path` has a `.json` extension (any case)
#[must_use]
pub fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Store backed by one JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Bind a store to `path`
    ///
    /// The file does not need to exist until the first read.
    ///
    /// # Errors
    /// `StoreError::NotJsonFile` when the path lacks a `.json` extension.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !is_json_file(&path) {
            return Err(StoreError::NotJsonFile(path));
        }
        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Items whose `property` strictly equals `value`
    ///
    /// No trimming or case folding; `"1"` does not equal `1`.
    ///
    /// # Errors
    /// Propagates read and parse failures.
    pub async fn find_items(&self, property: &str, value: &Value) -> Result<Collection, StoreError> {
        let items = self.read().await?;
        Ok(items
            .into_iter()
            .filter(|item| item.get(property) == Some(value))
            .collect())
    }

    async fn read(&self) -> Result<Collection, StoreError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        let stored: StoredCollection = serde_json::from_str(&text)?;
        stored.into_items()
    }

    async fn write(&self, items: &Collection) -> Result<(), StoreError> {
        let mut text = serde_json::to_string_pretty(items)?;
        text.push('\n');

        let staging = self.staging_path();
        tokio::fs::write(&staging, text)
            .await
            .map_err(|err| StoreError::io(&staging, err))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|err| StoreError::io(&self.path, err))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl CollectionStore for JsonFileStore {
    async fn fetch_all(&self) -> Result<Collection, StoreError> {
        self.read().await
    }

    async fn replace_all(&self, items: Collection) -> Result<Collection, StoreError> {
        // held through the re-read so the echo is this write's content
        let _write = self.write_lock.lock().await;
        self.write(&items).await?;
        tracing::debug!(path = %self.path.display(), items = items.len(), "collection written");
        self.read().await
    }
}
