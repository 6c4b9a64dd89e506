//! Storage port - persisted record set and import timestamp

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::result::Result;
use crate::domain::Drug;

/// Key the ordered record list is stored under
pub const DRUGS_KEY: &str = "anbaryad_drugs";

/// Key the last successful import timestamp is stored under
pub const LAST_IMPORT_KEY: &str = "anbaryad_last_import";

/// Persistence abstraction for the inventory
///
/// Implementations report failures as errors; callers decide whether a
/// failed load counts as "no data".
#[async_trait]
pub trait InventoryStorage: Send + Sync {
    // === Records ===

    /// Load the stored record list, in stored order
    async fn load_drugs(&self) -> Result<Vec<Drug>>;

    /// Replace the stored record list
    async fn save_drugs(&self, drugs: &[Drug]) -> Result<()>;

    // === Import metadata ===

    async fn load_last_import(&self) -> Result<Option<DateTime<Utc>>>;

    async fn save_last_import(&self, at: DateTime<Utc>) -> Result<()>;

    /// Remove every stored key
    async fn clear_all(&self) -> Result<()>;
}
