//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. The import path
//! runs leaf to root: workbook → normalize → header → row_parser →
//! reconcile, orchestrated by `InventoryService`.

pub mod export;
pub mod header;
pub mod import;
mod inventory;
pub mod logging;
pub mod normalize;
pub mod reconcile;
pub mod row_parser;
pub mod workbook;

pub use export::{export_report, report_file_name, ExportOptions};
pub use header::{ColumnMap, HeaderDetector, HeaderKeywords};
pub use import::{Extraction, ImportPipeline};
pub use inventory::InventoryService;
pub use logging::{events, ActivitySummary, EntryPoint, LogEntry, LogEvent, LoggingService};
pub use normalize::{normalize, RepairStrategy, TextNormalizer};
pub use reconcile::{dedupe_by_id, reconcile, Reconciliation};
pub use row_parser::RowParser;
pub use workbook::{decode_grid, read_workbook, write_workbook, ReadOptions, SheetData};
