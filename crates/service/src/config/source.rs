use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::ConfigMap;
use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// Persistence collaborator for the configuration blob.
/// Implementations can be file-backed, database-backed, or remote KV.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Load the whole blob. Failure is fatal to whoever is constructing a resolver.
    async fn load(&self) -> Result<ConfigMap, ServiceError>;
    /// Replace the whole blob.
    async fn save(&self, config: &ConfigMap) -> Result<(), ServiceError>;
}

/// Blob persisted as a single JSON object on disk.
#[derive(Clone, Debug)]
pub struct FileConfigSource {
    store: JsonMapStore<String, String>,
}

impl FileConfigSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { store: JsonMapStore::new(path) }
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn load(&self) -> Result<ConfigMap, ServiceError> {
        let map = self.store.read_or_init().await?;
        debug!(path = %self.store.path().display(), keys = map.len(), "configuration loaded");
        Ok(map)
    }

    async fn save(&self, config: &ConfigMap) -> Result<(), ServiceError> {
        self.store.write_all(config).await?;
        debug!(path = %self.store.path().display(), keys = config.len(), "configuration saved");
        Ok(())
    }
}

/// Blob kept in process memory; for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigSource {
    inner: RwLock<ConfigMap>,
}

impl MemoryConfigSource {
    pub fn new(config: ConfigMap) -> Self {
        Self { inner: RwLock::new(config) }
    }
}

#[async_trait]
impl ConfigSource for MemoryConfigSource {
    async fn load(&self) -> Result<ConfigMap, ServiceError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, config: &ConfigMap) -> Result<(), ServiceError> {
        *self.inner.write().await = config.clone();
        Ok(())
    }
}
