//! Import pipeline - file bytes to candidate records
//!
//! Read and decode the file, repair mis-decoded text, locate the header,
//! map columns, and parse every data row. Reconciliation against the stored
//! set and persistence happen in [`InventoryService`](super::InventoryService).

use std::path::Path;

use serde::Serialize;

use crate::config::ImportSettings;
use crate::domain::{Drug, Grid, Locale};
use crate::services::header::{ColumnMap, HeaderDetector};
use crate::services::normalize::TextNormalizer;
use crate::services::row_parser::RowParser;
use crate::services::workbook::{is_csv_path, read_workbook, ReadOptions};

/// Records and row errors extracted from one grid
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub header_row: usize,
    pub columns: ColumnMap,
    #[serde(skip)]
    pub candidates: Vec<Drug>,
    /// Displayable `row <n>: <detail>` messages
    pub errors: Vec<String>,
    /// Data rows dropped by validation
    pub skipped_rows: usize,
}

/// The configured ingest path from bytes to candidates
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    normalizer: TextNormalizer,
    detector: HeaderDetector,
    parser: RowParser,
    read_options: ReadOptions,
    locale: Locale,
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self::new(&ImportSettings::default(), Locale::default())
    }
}

impl ImportPipeline {
    pub fn new(settings: &ImportSettings, locale: Locale) -> Self {
        let normalizer = settings.normalizer();
        Self {
            detector: HeaderDetector::new(settings.header_scan_rows, &settings.extra_keywords),
            parser: RowParser::new(normalizer.clone(), locale),
            normalizer,
            read_options: settings.read_options(),
            locale,
        }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Read and decode a file. The error is a displayable message.
    pub async fn read_file(&self, path: &Path) -> Result<Grid, String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| self.locale.file_unreadable(&e.to_string()))?;

        let is_csv = is_csv_path(path);
        tracing::debug!(is_csv, size = bytes.len(), "decoding import file");

        read_workbook(bytes, is_csv, self.read_options)
            .await
            .map_err(|e| self.locale.file_unreadable(&e.to_string()))
    }

    /// Repair the grid, find the header and parse every following row
    pub fn extract(&self, mut grid: Grid) -> Extraction {
        self.normalizer.repair_grid(&mut grid);

        let header_row = self.detector.find_header_row(&grid);
        let columns = grid
            .get(header_row)
            .map(|header| self.detector.map_columns(header))
            .unwrap_or(ColumnMap::FALLBACK);
        tracing::debug!(header_row, ?columns, "columns mapped");

        let mut extraction = Extraction {
            header_row,
            columns,
            ..Extraction::default()
        };

        for (index, row) in grid.iter().enumerate().skip(header_row + 1) {
            match self.parser.parse_row(row, &columns, index + 1) {
                Ok(Some(drug)) => extraction.candidates.push(drug),
                Ok(None) => extraction.skipped_rows += 1,
                Err(message) => extraction.errors.push(message),
            }
        }

        tracing::debug!(
            candidates = extraction.candidates.len(),
            skipped = extraction.skipped_rows,
            errors = extraction.errors.len(),
            "rows parsed"
        );
        extraction
    }
}
