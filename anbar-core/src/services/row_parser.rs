//! Row parsing: one grid row plus a column map into a candidate record

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{is_valid_quantity, Cell, Drug, Locale};
use crate::services::header::ColumnMap;
use crate::services::normalize::TextNormalizer;

/// Leading numeric prefix, the way lenient float parsers read "12.5 box"
static NUMBER_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("number prefix pattern is valid")
});

/// Lenient quantity parse: leading whitespace skipped, trailing text ignored.
/// Persian and Arabic-Indic digits are accepted and thousands separators
/// dropped. Returns `None` when no numeric prefix exists.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let ascii: String = raw
        .trim_start()
        .chars()
        .filter(|c| !matches!(c, ',' | '\u{066C}'))
        .map(|c| match c {
            '۰'..='۹' => char::from(b'0' + (c as u32 - '۰' as u32) as u8),
            '٠'..='٩' => char::from(b'0' + (c as u32 - '٠' as u32) as u8),
            '\u{066B}' => '.',
            _ => c,
        })
        .collect();

    NUMBER_PREFIX_RE
        .find(&ascii)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Converts rows into validated records
#[derive(Debug, Clone, Default)]
pub struct RowParser {
    normalizer: TextNormalizer,
    locale: Locale,
}

impl RowParser {
    pub fn new(normalizer: TextNormalizer, locale: Locale) -> Self {
        Self { normalizer, locale }
    }

    /// Parse one data row.
    ///
    /// `Ok(None)` means the row was skipped: empty code or name, or a
    /// quantity that is missing a numeric value, negative, or non-finite.
    /// `Err` carries a displayable `row <n>: <detail>` message for cells that
    /// hold spreadsheet error values.
    pub fn parse_row(
        &self,
        row: &[Cell],
        columns: &ColumnMap,
        row_number: usize,
    ) -> Result<Option<Drug>, String> {
        let code = self.text_field(row, columns.code, row_number)?;
        let name = self.text_field(row, columns.name, row_number)?;
        let raw_qty = self.raw_field(row, columns.system_qty, row_number)?;

        if code.is_empty() || name.is_empty() {
            return Ok(None);
        }

        let system_qty = match raw_qty {
            Some(Cell::Number(n)) => Some(*n),
            Some(cell) if !cell.is_blank() => parse_quantity(&cell.as_text()),
            _ => Some(0.0),
        };

        match system_qty {
            Some(qty) if is_valid_quantity(qty) => Ok(Some(Drug::new(code, name, qty))),
            _ => Ok(None),
        }
    }

    fn raw_field<'a>(
        &self,
        row: &'a [Cell],
        column: Option<usize>,
        row_number: usize,
    ) -> Result<Option<&'a Cell>, String> {
        let cell = column.and_then(|index| row.get(index));
        if let Some(Cell::Error(value)) = cell {
            let detail = self.locale.cell_error_value(value);
            return Err(self.locale.row_error(row_number, &detail));
        }
        Ok(cell)
    }

    fn text_field(
        &self,
        row: &[Cell],
        column: Option<usize>,
        row_number: usize,
    ) -> Result<String, String> {
        Ok(self
            .raw_field(row, column, row_number)?
            .map(|cell| self.normalizer.clean(&cell.as_text()))
            .unwrap_or_default())
    }
}
