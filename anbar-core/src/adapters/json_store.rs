//! JSON file storage - one document per storage key in the data directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::Drug;
use crate::ports::{InventoryStorage, DRUGS_KEY, LAST_IMPORT_KEY};
use crate::services::reconcile::dedupe_by_id;

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    async fn read_key<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write through a temp file and rename, so readers never see a partial document
    async fn write_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let content = serde_json::to_vec_pretty(value)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::storage(format!("Failed to create {}: {}", self.dir.display(), e)))?;

        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| Error::storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::storage(format!("Failed to replace {}: {}", path.display(), e)))?;
        Ok(())
    }

    async fn remove_key(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!("Failed to remove {}: {}", key, e))),
        }
    }
}

#[async_trait]
impl InventoryStorage for JsonFileStorage {
    async fn load_drugs(&self) -> Result<Vec<Drug>> {
        let drugs: Vec<Drug> = self.read_key(DRUGS_KEY).await?.unwrap_or_default();
        Ok(dedupe_by_id(drugs))
    }

    async fn save_drugs(&self, drugs: &[Drug]) -> Result<()> {
        let unique = dedupe_by_id(drugs.to_vec());
        self.write_key(DRUGS_KEY, &unique).await
    }

    async fn load_last_import(&self) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self.read_key(LAST_IMPORT_KEY).await?;
        match raw {
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| Error::storage(format!("Invalid import timestamp: {}", e))),
            None => Ok(None),
        }
    }

    async fn save_last_import(&self, at: DateTime<Utc>) -> Result<()> {
        self.write_key(LAST_IMPORT_KEY, &at.to_rfc3339()).await
    }

    async fn clear_all(&self) -> Result<()> {
        self.remove_key(DRUGS_KEY).await?;
        self.remove_key(LAST_IMPORT_KEY).await
    }
}
