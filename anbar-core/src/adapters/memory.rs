//! In-memory storage, with optional failure injection for tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::result::{Error, Result};
use crate::domain::Drug;
use crate::ports::InventoryStorage;

#[derive(Debug, Default)]
struct Stored {
    drugs: Vec<Drug>,
    last_import: Option<DateTime<Utc>>,
}

/// Keeps everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    stored: Mutex<Stored>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent load return an error
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent save and clear return an error
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Stored>> {
        self.stored
            .lock()
            .map_err(|_| Error::storage("memory storage lock poisoned"))
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(Error::storage(format!("injected {} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStorage for MemoryStorage {
    async fn load_drugs(&self) -> Result<Vec<Drug>> {
        self.check(&self.fail_loads, "load")?;
        Ok(self.lock()?.drugs.clone())
    }

    async fn save_drugs(&self, drugs: &[Drug]) -> Result<()> {
        self.check(&self.fail_saves, "save")?;
        self.lock()?.drugs = drugs.to_vec();
        Ok(())
    }

    async fn load_last_import(&self) -> Result<Option<DateTime<Utc>>> {
        self.check(&self.fail_loads, "load")?;
        Ok(self.lock()?.last_import)
    }

    async fn save_last_import(&self, at: DateTime<Utc>) -> Result<()> {
        self.check(&self.fail_saves, "save")?;
        self.lock()?.last_import = Some(at);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.check(&self.fail_saves, "clear")?;
        *self.lock()? = Stored::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_injection() {
        let storage = MemoryStorage::new();
        storage.save_drugs(&[Drug::new("A", "a", 1.0)]).await.unwrap();

        storage.fail_saves(true);
        assert!(storage.save_drugs(&[]).await.is_err());
        assert!(storage.clear_all().await.is_err());
        assert_eq!(storage.load_drugs().await.unwrap().len(), 1);

        storage.fail_loads(true);
        assert!(storage.load_drugs().await.is_err());
    }
}
