use std::{collections::BTreeMap, io::ErrorKind, marker::PhantomData, path::PathBuf};
use tokio::fs;

use crate::errors::ServiceError;

/// JSON file holding a whole `BTreeMap<K, V>`.
///
/// The map is always read and written as one blob: there are no per-key
/// updates, so readers never observe a partially merged file. Writes go to a
/// sibling temp file which is then renamed over the target.
#[derive(Clone, Debug)]
pub struct JsonMapStore<K, V> {
    file_path: PathBuf,
    _entry: PhantomData<fn() -> (K, V)>,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Ord + serde::Serialize + serde::de::DeserializeOwned,
    V: serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), _entry: PhantomData }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.file_path
    }

    /// Read the whole map. A missing file is created with an empty map; an
    /// unreadable or corrupt file is reported as `ServiceError::Storage`.
    pub async fn read_or_init(&self) -> Result<BTreeMap<K, V>, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::storage(&self.file_path, format!("corrupt blob: {e}"))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let empty = BTreeMap::new();
                self.write_all(&empty).await?;
                Ok(empty)
            }
            Err(e) => Err(ServiceError::storage(&self.file_path, e)),
        }
    }

    /// Replace the file contents with `map`.
    pub async fn write_all(&self, map: &BTreeMap<K, V>) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ServiceError::storage(parent, e))?;
            }
        }
        let data = serde_json::to_vec_pretty(map).map_err(|e| ServiceError::Serialization(e.to_string()))?;
        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(|e| ServiceError::storage(&tmp, e))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::storage(&self.file_path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_map_store_{}/config.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_is_created_empty() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = JsonMapStore::<String, String>::new(&path);

        assert!(store.read_or_init().await?.is_empty());
        assert!(tokio::fs::metadata(&path).await.is_ok());

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn write_replaces_whole_map() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = JsonMapStore::<String, String>::new(&path);

        let mut first = BTreeMap::new();
        first.insert("a".to_string(), "1".to_string());
        first.insert("b".to_string(), "2".to_string());
        store.write_all(&first).await?;

        let mut second = BTreeMap::new();
        second.insert("c".to_string(), "3".to_string());
        store.write_all(&second).await?;

        // reload through a fresh handle
        let reloaded = JsonMapStore::<String, String>::new(&path).read_or_init().await?;
        assert_eq!(reloaded, second);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_storage_unavailable() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        tokio::fs::create_dir_all(path.parent().unwrap()).await?;
        tokio::fs::write(&path, b"{not json").await?;

        let store = JsonMapStore::<String, String>::new(&path);
        assert!(matches!(store.read_or_init().await, Err(ServiceError::Storage(_))));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}
