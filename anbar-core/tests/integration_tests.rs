//! Integration tests for anbar-core
//!
//! These tests run the import/export pipeline end to end against real files
//! in a temporary data directory: CSV and generated .xlsx inputs, JSON
//! storage on disk.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use anbar_core::adapters::{JsonFileStorage, MemoryStorage};
use anbar_core::config::Config;
use anbar_core::services::workbook::{decode_grid, write_workbook, ReadOptions, SheetData};
use anbar_core::{AnbarContext, Cell, DrugUpdate, Locale};

// ============================================================================
// Test Helpers
// ============================================================================

/// English messages, exports written inside the temp dir
fn test_config(temp: &TempDir) -> Config {
    let mut config = Config::default();
    config.set_locale(Locale::En);
    config.export.directory = Some(temp.path().join("exports"));
    config
}

async fn json_context(temp: &TempDir) -> AnbarContext {
    let data_dir = temp.path().join("data");
    let storage = Arc::new(JsonFileStorage::new(&data_dir));
    AnbarContext::with_storage(&data_dir, test_config(temp), storage)
        .await
        .expect("Failed to create context")
}

fn write_file(temp: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = temp.path().join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn mis_decode(text: &str) -> String {
    encoding_rs::WINDOWS_1252
        .decode_without_bom_handling(text.as_bytes())
        .0
        .into_owned()
}

fn triples(ctx: &AnbarContext) -> Vec<(String, String, f64)> {
    ctx.inventory
        .drugs()
        .iter()
        .map(|d| (d.code.clone(), d.name.clone(), d.system_qty()))
        .collect()
}

const STOCK_CSV: &str = "\u{FEFF}ردیف,کد کالا,نام دارو,موجودی سیستم\n\
    1,ABC123,\"Drug, with comma\",100\n\
    2,DEF456,Ibuprofen 400,50\n\
    3,GHI789,Vitamin C,-10\n\
    4,JKL012,\"استامینوفن ۵۰۰\",0\n";

// ============================================================================
// Import Tests
// ============================================================================

#[tokio::test]
async fn test_csv_import_parses_quoted_fields_and_skips_invalid_rows() {
    let temp = TempDir::new().unwrap();
    let mut ctx = json_context(&temp).await;
    let path = write_file(&temp, "stock.csv", STOCK_CSV.as_bytes());

    let result = ctx.inventory.import_file(&path).await;

    assert!(result.success, "{:?}", result);
    assert_eq!(result.imported_count, 3);
    assert!(result.errors.is_empty());
    assert_eq!(
        triples(&ctx),
        vec![
            ("ABC123".to_string(), "Drug, with comma".to_string(), 100.0),
            ("DEF456".to_string(), "Ibuprofen 400".to_string(), 50.0),
            ("JKL012".to_string(), "استامینوفن ۵۰۰".to_string(), 0.0),
        ]
    );
    assert!(ctx.inventory.drugs().iter().all(|d| d.difference() == 0.0));
}

#[tokio::test]
async fn test_importing_same_file_twice_adds_nothing() {
    let temp = TempDir::new().unwrap();
    let path = write_file(&temp, "stock.csv", STOCK_CSV.as_bytes());

    let mut ctx = json_context(&temp).await;
    let first = ctx.inventory.import_file(&path).await;
    assert_eq!(first.imported_count, 3);

    // Fresh context, state comes back from disk
    let mut ctx = json_context(&temp).await;
    assert_eq!(ctx.inventory.drugs().len(), 3);
    assert!(ctx.inventory.last_import_date().is_some());

    let second = ctx.inventory.import_file(&path).await;
    assert!(!second.success);
    assert_eq!(second.imported_count, 0);
    assert_eq!(ctx.inventory.drugs().len(), 3);
}

#[tokio::test]
async fn test_headerless_file_falls_back_to_default_layout() {
    let temp = TempDir::new().unwrap();
    let mut ctx = json_context(&temp).await;
    let path = write_file(&temp, "raw.csv", b"1,X1,Foo,10\n2,X2,Bar,20\n3,X3,Baz,30\n");

    let result = ctx.inventory.import_file(&path).await;

    // Row 0 is taken as the header, the rest map to code/name/qty at 1/2/3
    assert!(result.success);
    assert_eq!(result.imported_count, 2);
    let codes: Vec<&str> = ctx.inventory.drugs().iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["X2", "X3"]);
}

#[tokio::test]
async fn test_empty_file_is_a_structural_failure() {
    let temp = TempDir::new().unwrap();
    let mut ctx = json_context(&temp).await;

    let csv = write_file(&temp, "empty.csv", b"");
    let result = ctx.inventory.import_file(&csv).await;
    assert!(!result.success);
    assert_eq!(result.errors, vec!["The file is empty".to_string()]);

    let blank_sheet = write_workbook(&[SheetData::new("Sheet1", vec![vec![Cell::Empty]])]).unwrap();
    let xlsx = write_file(&temp, "empty.xlsx", &blank_sheet);
    let result = ctx.inventory.import_file(&xlsx).await;
    assert!(!result.success);
}

#[tokio::test]
async fn test_mis_decoded_spreadsheet_is_repaired() {
    let temp = TempDir::new().unwrap();
    let mut ctx = json_context(&temp).await;

    let sheet = SheetData::new(
        "Sheet1",
        vec![
            vec![Cell::text("گزارش انبار")],
            vec![
                Cell::text(mis_decode("ردیف")),
                Cell::text(mis_decode("کد کالا")),
                Cell::text(mis_decode("نام دارو")),
                Cell::text(mis_decode("موجودی سیستم")),
            ],
            vec![
                Cell::Number(1.0),
                Cell::Number(1001.0),
                Cell::text(mis_decode("آسپرین")),
                Cell::Number(40.0),
            ],
        ],
    );
    let path = write_file(&temp, "broken.xlsx", &write_workbook(&[sheet]).unwrap());

    let result = ctx.inventory.import_file(&path).await;

    assert!(result.success, "{:?}", result);
    assert_eq!(triples(&ctx), vec![("1001".to_string(), "آسپرین".to_string(), 40.0)]);
}

#[tokio::test]
async fn test_typographic_variants_dedupe_on_import() {
    let temp = TempDir::new().unwrap();
    let mut ctx = json_context(&temp).await;

    let first = write_file(&temp, "a.csv", "code,name,qty\nA\u{2013}1,Vitamin\u{2002}C,5\n".as_bytes());
    let second = write_file(&temp, "b.csv", b"code,name,qty\nA-1,Vitamin C,5\n");

    assert_eq!(ctx.inventory.import_file(&first).await.imported_count, 1);
    assert_eq!(triples(&ctx), vec![("A-1".to_string(), "Vitamin C".to_string(), 5.0)]);

    let result = ctx.inventory.import_file(&second).await;
    assert!(!result.success);
    assert_eq!(ctx.inventory.drugs().len(), 1);
}

#[tokio::test]
async fn test_persistence_failure_becomes_warning() {
    let temp = TempDir::new().unwrap();
    let storage = Arc::new(MemoryStorage::new());
    storage.fail_saves(true);
    let mut ctx = AnbarContext::with_storage(temp.path(), test_config(&temp), storage)
        .await
        .unwrap();

    let path = write_file(&temp, "stock.csv", STOCK_CSV.as_bytes());
    let result = ctx.inventory.import_file(&path).await;

    assert!(result.success);
    assert_eq!(result.imported_count, 3);
    assert_eq!(result.warnings, vec!["Failed to save drug data".to_string()]);
    assert_eq!(ctx.inventory.drugs().len(), 3);
}

// ============================================================================
// Export Tests
// ============================================================================

#[tokio::test]
async fn test_export_then_reimport_round_trip() {
    let temp = TempDir::new().unwrap();
    let mut ctx = json_context(&temp).await;
    let path = write_file(&temp, "stock.csv", STOCK_CSV.as_bytes());
    ctx.inventory.import_file(&path).await;
    ctx.inventory
        .update_drug("ABC123", DrugUpdate::physical(80.0))
        .await
        .unwrap();
    let original = triples(&ctx);

    let report = ctx.inventory.export_report(None, None).await.unwrap();
    assert!(report.starts_with(temp.path().join("exports")));
    assert!(report
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("anbaryad_export_"));

    // Import the report into an empty store
    let fresh_dir = TempDir::new().unwrap();
    let mut fresh = json_context(&fresh_dir).await;
    let result = fresh.inventory.import_file(&report).await;

    assert!(result.success, "{:?}", result);
    assert_eq!(triples(&fresh), original);
    assert!(fresh.inventory.drugs().iter().all(|d| d.physical_qty() == 0.0));
}

#[tokio::test]
async fn test_export_contains_summary_sheet() {
    let temp = TempDir::new().unwrap();
    let mut ctx = json_context(&temp).await;
    ctx.inventory.add_drug("A", "Alpha", 100.0).await.unwrap();
    ctx.inventory.add_drug("B", "Beta", 50.0).await.unwrap();
    ctx.inventory.add_drug("C", "Gamma", 200.0).await.unwrap();
    ctx.inventory.update_drug("A", DrugUpdate::physical(80.0)).await.unwrap();
    ctx.inventory.update_drug("B", DrugUpdate::physical(70.0)).await.unwrap();

    let stats = ctx.inventory.stats();
    assert_eq!(stats.counted_items, 2);
    assert_eq!(stats.shortage_items, 1);
    assert_eq!(stats.surplus_items, 1);
    assert_eq!(stats.matched_items, 0);
    assert_eq!(stats.total_difference, 0.0);

    let report = ctx.inventory.export_report(Some("audit"), None).await.unwrap();
    let bytes = std::fs::read(&report).unwrap();

    // Only the first sheet is read back: the detail rows
    let grid = decode_grid(&bytes, false, &ReadOptions::default()).unwrap();
    assert_eq!(grid.len(), 4);
    assert_eq!(grid[1][6], Cell::text("shortage 20"));
    assert_eq!(grid[2][6], Cell::text("surplus 20"));
    assert_eq!(grid[3][6], Cell::text("matched"));
}

#[tokio::test]
async fn test_export_failure_is_an_error() {
    let temp = TempDir::new().unwrap();
    let blocker = write_file(&temp, "not-a-dir", b"x");

    let mut config = test_config(&temp);
    config.export.directory = Some(blocker.join("reports"));
    let ctx = AnbarContext::with_storage(temp.path(), config, Arc::new(MemoryStorage::new()))
        .await
        .unwrap();

    let err = ctx.inventory.export_report(None, None).await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to create Excel file"));
}

#[tokio::test]
async fn test_context_reads_settings_file() {
    let temp = TempDir::new().unwrap();
    let data_dir: &Path = temp.path();
    std::fs::write(
        data_dir.join("settings.json"),
        r#"{"app":{"locale":"en"},"import":{"extraKeywords":{"code":["sku"],"name":["product"]}}}"#,
    )
    .unwrap();

    let mut ctx = AnbarContext::new(data_dir).await.unwrap();
    let path = write_file(&temp, "sku.csv", b"sku,product,on hand\nP-1,Gauze,12\n");
    let result = ctx.inventory.import_file(&path).await;

    assert!(result.success, "{:?}", result);
    // "on hand" is not a quantity keyword, so the quantity column is unmapped
    assert_eq!(triples(&ctx), vec![("P-1".to_string(), "Gauze".to_string(), 0.0)]);
    assert!(data_dir.join("anbaryad_drugs.json").exists());
}
