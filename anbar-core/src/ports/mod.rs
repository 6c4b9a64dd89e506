//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod storage;

pub use storage::{InventoryStorage, DRUGS_KEY, LAST_IMPORT_KEY};
