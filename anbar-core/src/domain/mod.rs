//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod cell;
mod drug;
pub mod filter;
pub mod messages;
pub mod result;
mod stats;

pub use cell::{row_is_blank, Cell, Grid, Row};
pub use drug::{is_valid_quantity, Drug, DrugStatus, DrugUpdate};
pub use filter::{InventoryFilters, SortBy};
pub use messages::Locale;
pub use result::{Error, ImportResult, Result};
pub use stats::InventoryStats;
