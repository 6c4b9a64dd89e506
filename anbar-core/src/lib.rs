//! AnbarYar Core - pharmacy inventory counting
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Drug, Cell, ImportResult, etc.)
//! - **ports**: Trait definitions for external dependencies (InventoryStorage)
//! - **services**: Spreadsheet ingestion, reconciliation, export and orchestration
//! - **adapters**: Concrete implementations (JSON files, memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::JsonFileStorage;
use config::Config;
use services::{ExportOptions, ImportPipeline};

// Re-export commonly used types at crate root
pub use domain::{
    Cell, Drug, DrugStatus, DrugUpdate, Grid, ImportResult, InventoryFilters, InventoryStats,
    Locale, SortBy,
};
pub use domain::result::Error;
pub use ports::InventoryStorage;
pub use services::{
    events, ActivitySummary, EntryPoint, InventoryService, LogEntry, LogEvent, LoggingService,
};

/// Main context for AnbarYar operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration and the inventory service with its state loaded.
pub struct AnbarContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub inventory: InventoryService,
}

impl AnbarContext {
    /// Create a context backed by JSON files in `data_dir`
    pub async fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let storage = Arc::new(JsonFileStorage::new(data_dir));
        Self::with_storage(data_dir, config, storage).await
    }

    /// Create a context with a caller-provided storage backend
    pub async fn with_storage(
        data_dir: &Path,
        config: Config,
        storage: Arc<dyn InventoryStorage>,
    ) -> Result<Self> {
        let pipeline = ImportPipeline::new(&config.import, config.locale);
        let export = ExportOptions {
            directory: config.export_dir(data_dir),
            file_prefix: config.export.file_prefix.clone(),
            include_summary: config.export.include_summary,
            locale: config.locale,
        };

        let mut inventory = InventoryService::new(storage, pipeline, export);
        inventory.load().await;

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            inventory,
        })
    }
}
