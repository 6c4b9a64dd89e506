//! Workbook reader and writer
//!
//! Reading turns CSV text or a spreadsheet container (xlsx, xls, ods) into
//! a [`Grid`]. Only the first sheet is read. Bytes that fail to open as a
//! spreadsheet are retried as CSV, since files are often misnamed.
//!
//! Writing produces an xlsx container with one worksheet per [`SheetData`].

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use encoding_rs::{Encoding, UTF_8};
use rust_xlsxwriter::{Format, Workbook};

use crate::domain::{row_is_blank, Cell, Error, Grid, Result, Row};

/// True when the file should be read as CSV text
pub fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Lower-cased file extension used to label the input kind in event logs
pub fn source_kind(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Decoding options for [`read_workbook`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Encoding tried when CSV bytes are not valid UTF-8
    pub fallback_encoding: Option<&'static Encoding>,
}

impl ReadOptions {
    /// Resolve a WHATWG encoding label such as `windows-1256`
    pub fn with_fallback_label(label: Option<&str>) -> Self {
        Self {
            fallback_encoding: label.and_then(|l| Encoding::for_label(l.trim().as_bytes())),
        }
    }
}

/// Decode file bytes into a grid off the async executor
pub async fn read_workbook(bytes: Vec<u8>, is_csv: bool, options: ReadOptions) -> Result<Grid> {
    tokio::task::spawn_blocking(move || decode_grid(&bytes, is_csv, &options))
        .await
        .map_err(|e| Error::workbook(format!("decode task failed: {}", e)))?
}

/// Decode file bytes into a grid. Blank rows are dropped.
pub fn decode_grid(bytes: &[u8], is_csv: bool, options: &ReadOptions) -> Result<Grid> {
    if is_csv {
        return parse_csv(&decode_text(bytes, options));
    }

    match parse_spreadsheet(bytes) {
        Ok(grid) => Ok(grid),
        Err(e) => {
            tracing::debug!(error = %e, "spreadsheet decode failed, retrying as CSV");
            parse_csv(&decode_text(bytes, options))
        }
    }
}

/// UTF-8 decode with BOM removal; falls back to the configured encoding
/// when the bytes are not valid UTF-8, lossy UTF-8 otherwise
fn decode_text(bytes: &[u8], options: &ReadOptions) -> String {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if had_errors {
        if let Some(encoding) = options.fallback_encoding {
            tracing::debug!(encoding = encoding.name(), "input is not UTF-8, using fallback encoding");
            let (text, _, _) = encoding.decode(bytes);
            return text.into_owned();
        }
        tracing::warn!("input is not valid UTF-8, invalid sequences replaced");
    }
    text.into_owned()
}

/// Parse comma-separated text. Quoted fields may contain commas, quotes
/// are escaped by doubling, rows may have differing lengths.
pub fn parse_csv(text: &str) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut grid = Grid::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = record.iter().map(Cell::text).collect();
        if !row_is_blank(&row) {
            grid.push(row);
        }
    }
    Ok(grid)
}

fn parse_spreadsheet(bytes: &[u8]) -> Result<Grid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::workbook("workbook has no sheets"))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect::<Row>())
        .filter(|row| !row_is_blank(row))
        .collect())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(format!("{:?}", e)),
    }
}

/// One worksheet to write
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Row>,
    /// Width hints, by column, in character units
    pub column_widths: Vec<f64>,
    pub right_to_left: bool,
    /// Render the first row bold
    pub header_row: bool,
}

impl SheetData {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
            ..Self::default()
        }
    }

    pub fn with_column_widths(mut self, widths: &[f64]) -> Self {
        self.column_widths = widths.to_vec();
        self
    }

    pub fn right_to_left(mut self, rtl: bool) -> Self {
        self.right_to_left = rtl;
        self
    }

    pub fn with_header_row(mut self) -> Self {
        self.header_row = true;
        self
    }
}

/// Encode sheets into an xlsx container off the async executor
pub async fn encode_workbook(sheets: Vec<SheetData>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || write_workbook(&sheets))
        .await
        .map_err(|e| Error::workbook(format!("encode task failed: {}", e)))?
}

/// Encode sheets into an xlsx container, in order
pub fn write_workbook(sheets: &[SheetData]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        worksheet.set_right_to_left(sheet.right_to_left);

        for (col, width) in sheet.column_widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let r = row_idx as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let c = col_idx as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) if sheet.header_row && row_idx == 0 => {
                        worksheet.write_string_with_format(r, c, s, &bold)?;
                    }
                    Cell::Text(s) | Cell::Error(s) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_quoted_comma() {
        let grid = parse_csv("ABC123,\"Drug, with comma\",100\n").unwrap();
        assert_eq!(
            grid,
            vec![vec![Cell::text("ABC123"), Cell::text("Drug, with comma"), Cell::text("100")]]
        );
    }

    #[test]
    fn test_csv_drops_blank_lines_and_allows_ragged_rows() {
        let grid = parse_csv("code,name,qty\n\n , , \nA1,Aspirin\nB2,Ibuprofen,5,extra\n").unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1].len(), 2);
        assert_eq!(grid[2].len(), 4);
    }

    #[test]
    fn test_csv_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("کد,نام\n".as_bytes());
        let grid = decode_grid(&bytes, true, &ReadOptions::default()).unwrap();
        assert_eq!(grid[0][0], Cell::text("کد"));
    }

    #[test]
    fn test_csv_fallback_encoding() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1256.encode("کد,نام\n1,دارو\n");
        let options = ReadOptions::with_fallback_label(Some("windows-1256"));
        assert!(options.fallback_encoding.is_some());

        let grid = decode_grid(&bytes, true, &options).unwrap();
        assert_eq!(grid[1][1], Cell::text("دارو"));
    }

    #[test]
    fn test_misnamed_csv_falls_back_to_text() {
        let grid = decode_grid(b"a,b,c\n1,2,3\n", false, &ReadOptions::default()).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1][2], Cell::text("3"));
    }

    #[test]
    fn test_xlsx_round_trip_keeps_first_sheet() {
        let first = SheetData::new(
            "items",
            vec![
                vec![Cell::text("code"), Cell::text("name"), Cell::text("qty")],
                vec![Cell::text("A1"), Cell::text("آسپرین"), Cell::Number(12.0)],
                vec![],
                vec![Cell::text("B2"), Cell::Empty, Cell::Bool(true)],
            ],
        )
        .with_header_row()
        .with_column_widths(&[10.0, 20.0, 8.0])
        .right_to_left(true);
        let second = SheetData::new("other", vec![vec![Cell::text("ignored")]]);

        let bytes = write_workbook(&[first, second]).unwrap();
        let grid = decode_grid(&bytes, false, &ReadOptions::default()).unwrap();

        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1][1], Cell::text("آسپرین"));
        assert_eq!(grid[1][2], Cell::Number(12.0));
        assert_eq!(grid[2][2], Cell::Bool(true));
    }

    #[test]
    fn test_is_csv_path() {
        assert!(is_csv_path(Path::new("/tmp/stock.CSV")));
        assert!(!is_csv_path(Path::new("/tmp/stock.xlsx")));
        assert!(!is_csv_path(Path::new("/tmp/stock")));
        assert_eq!(source_kind(Path::new("a/b.XLSX")), "xlsx");
        assert_eq!(source_kind(Path::new("a/b")), "unknown");
    }
}
