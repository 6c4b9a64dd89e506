//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - JSON documents in the data directory for InventoryStorage
//! - In-process memory for InventoryStorage (tests, dry runs)

pub mod json_store;
pub mod memory;

pub use json_store::JsonFileStorage;
pub use memory::MemoryStorage;
