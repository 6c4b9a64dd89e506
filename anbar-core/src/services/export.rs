//! Report export: record set to a reconciled xlsx workbook on disk

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::domain::{Cell, Drug, Error, InventoryStats, Locale, Result, Row};
use crate::services::workbook::{encode_workbook, SheetData};

/// Default file name prefix for exported reports
pub const DEFAULT_EXPORT_PREFIX: &str = "anbaryad_export";

/// Sub-directory of the documents area reports are written to
pub const EXPORT_SUBDIR: &str = "AnbarYar";

const DETAIL_COLUMN_WIDTHS: [f64; 8] = [8.0, 15.0, 30.0, 15.0, 15.0, 12.0, 15.0, 25.0];
const SUMMARY_COLUMN_WIDTHS: [f64; 2] = [20.0, 15.0];

/// `<prefix>_<YYYY-MM-DD>.xlsx`
pub fn report_file_name(prefix: &str, date: NaiveDate) -> String {
    let prefix = prefix.trim();
    let prefix = if prefix.is_empty() { DEFAULT_EXPORT_PREFIX } else { prefix };
    format!("{}_{}.xlsx", prefix, date.format("%Y-%m-%d"))
}

/// Default export directory: documents area, else `fallback`, plus the app sub-directory
pub fn default_export_dir(fallback: &Path) -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(|| fallback.to_path_buf())
        .join(EXPORT_SUBDIR)
}

/// Detail sheet: one row per record, row numbers start at 1
pub fn detail_sheet(drugs: &[Drug], locale: Locale) -> SheetData {
    let mut rows: Vec<Row> = Vec::with_capacity(drugs.len() + 1);
    rows.push(locale.detail_headers().iter().map(|h| Cell::text(*h)).collect());

    for (index, drug) in drugs.iter().enumerate() {
        rows.push(vec![
            Cell::from(index + 1),
            Cell::text(drug.code.as_str()),
            Cell::text(drug.name.as_str()),
            Cell::Number(drug.system_qty()),
            Cell::Number(drug.physical_qty()),
            Cell::Number(drug.difference()),
            Cell::text(drug.status().label(locale)),
            drug.notes.as_deref().map(Cell::text).unwrap_or(Cell::Empty),
        ]);
    }

    SheetData::new(locale.detail_sheet_name(), rows)
        .with_column_widths(&DETAIL_COLUMN_WIDTHS)
        .right_to_left(locale == Locale::Fa)
        .with_header_row()
}

/// Summary sheet: label/value pairs
pub fn summary_sheet(stats: &InventoryStats, locale: Locale, date: NaiveDate) -> SheetData {
    let labels = locale.summary_labels();
    let pair = |label: &str, value: Cell| vec![Cell::text(label), value];

    let rows = vec![
        vec![Cell::text(labels.title)],
        pair(labels.report_date, Cell::text(date.format("%Y-%m-%d").to_string())),
        Vec::new(),
        vec![Cell::text(labels.overview)],
        pair(labels.total, Cell::from(stats.total_items)),
        pair(labels.counted, Cell::from(stats.counted_items)),
        pair(labels.matched, Cell::from(stats.matched_items)),
        pair(labels.shortage, Cell::from(stats.shortage_items)),
        pair(labels.surplus, Cell::from(stats.surplus_items)),
        pair(labels.total_difference, Cell::Number(stats.total_difference)),
    ];

    SheetData::new(locale.summary_sheet_name(), rows)
        .with_column_widths(&SUMMARY_COLUMN_WIDTHS)
        .right_to_left(locale == Locale::Fa)
        .with_header_row()
}

/// Sheets of a report. The detail sheet comes first so that a re-import,
/// which reads the first sheet, sees the records.
pub fn report_sheets(
    drugs: &[Drug],
    locale: Locale,
    include_summary: bool,
    date: NaiveDate,
) -> Vec<SheetData> {
    let mut sheets = vec![detail_sheet(drugs, locale)];
    if include_summary {
        sheets.push(summary_sheet(&InventoryStats::compute(drugs), locale, date));
    }
    sheets
}

/// Where and how a report is written
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub include_summary: bool,
    pub locale: Locale,
}

/// Encode the report and write it under `options.directory`, creating the
/// directory if needed. Returns the written file path.
pub async fn export_report(drugs: &[Drug], options: &ExportOptions) -> Result<PathBuf> {
    let locale = options.locale;
    let wrap = |detail: String| Error::export(locale.export_failed(&detail));

    let date = Local::now().date_naive();
    let sheets = report_sheets(drugs, locale, options.include_summary, date);
    let bytes = encode_workbook(sheets).await.map_err(|e| wrap(e.to_string()))?;

    tokio::fs::create_dir_all(&options.directory)
        .await
        .map_err(|e| wrap(e.to_string()))?;

    let path = options
        .directory
        .join(report_file_name(&options.file_prefix, date));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| wrap(e.to_string()))?;

    tracing::info!(path = %path.display(), records = drugs.len(), "report exported");
    Ok(path)
}
