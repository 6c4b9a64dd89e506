//! Header row detection and column mapping
//!
//! Inventory exports arrive with Persian or English headers, a leading
//! title block, and columns in any order. The locator finds the header row;
//! the mapper resolves which column holds code, name and system quantity.

use serde::{Deserialize, Serialize};

use crate::domain::Cell;

/// Default number of leading rows inspected for a header
pub const DEFAULT_HEADER_SCAN_ROWS: usize = 5;

const CODE_KEYWORDS: [&str; 2] = ["کد", "code"];
const NAME_KEYWORDS: [&str; 2] = ["نام", "name"];
const QUANTITY_KEYWORDS: [&str; 5] = ["موجودی", "quantity", "qty", "سیستم", "system"];

/// Keywords whose presence marks a row as the header row
const HEADER_KEYWORDS: [&str; 16] = [
    "کد کالا",
    "کد",
    "code",
    "itemcode",
    "item_code",
    "نام دارو",
    "نام",
    "name",
    "drug_name",
    "موجودی",
    "quantity",
    "qty",
    "systemqty",
    "system_qty",
    "ردیف",
    "row",
];

/// Extra header keywords, added on top of the built-in ones
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderKeywords {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quantity: Vec<String>,
}

impl HeaderKeywords {
    pub fn is_empty(&self) -> bool {
        self.code.is_empty() && self.name.is_empty() && self.quantity.is_empty()
    }

    fn all(&self) -> impl Iterator<Item = &String> {
        self.code.iter().chain(&self.name).chain(&self.quantity)
    }
}

/// Column indices of the fields the row parser reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMap {
    pub code: Option<usize>,
    pub name: Option<usize>,
    pub system_qty: Option<usize>,
}

impl ColumnMap {
    /// Layout assumed when no header cell is recognized: row number first,
    /// then code, name and quantity
    pub const FALLBACK: ColumnMap = ColumnMap {
        code: Some(1),
        name: Some(2),
        system_qty: Some(3),
    };

    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.name.is_none() && self.system_qty.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Code,
    Name,
    SystemQty,
}

/// Header locator and column mapper sharing one keyword configuration
#[derive(Debug, Clone)]
pub struct HeaderDetector {
    scan_rows: usize,
    header_keywords: Vec<String>,
    fields: Vec<(Field, Vec<String>)>,
}

impl Default for HeaderDetector {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_SCAN_ROWS, &HeaderKeywords::default())
    }
}

impl HeaderDetector {
    pub fn new(scan_rows: usize, extra: &HeaderKeywords) -> Self {
        let lower = |words: &[String]| -> Vec<String> {
            words.iter().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()).collect()
        };
        let with_extra = |builtin: &[&str], extra: &[String]| -> Vec<String> {
            builtin.iter().map(|w| w.to_string()).chain(lower(extra)).collect()
        };

        let header_keywords = HEADER_KEYWORDS
            .iter()
            .map(|w| w.to_string())
            .chain(extra.all().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()))
            .collect();

        Self {
            scan_rows: scan_rows.max(1),
            header_keywords,
            fields: vec![
                (Field::Code, with_extra(&CODE_KEYWORDS, &extra.code)),
                (Field::Name, with_extra(&NAME_KEYWORDS, &extra.name)),
                (Field::SystemQty, with_extra(&QUANTITY_KEYWORDS, &extra.quantity)),
            ],
        }
    }

    /// Index of the first row within the scan window containing any header
    /// keyword. Falls back to row 0 when nothing matches.
    pub fn find_header_row(&self, grid: &[Vec<Cell>]) -> usize {
        for (index, row) in grid.iter().take(self.scan_rows).enumerate() {
            let joined = row
                .iter()
                .map(Cell::as_text)
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();

            let matches = self
                .header_keywords
                .iter()
                .filter(|keyword| joined.contains(keyword.as_str()))
                .count();

            if matches > 0 {
                tracing::debug!(row = index, matches, "header row located");
                return index;
            }
        }

        tracing::debug!("no header keywords found, using first row");
        0
    }

    /// Map header cells to fields. The first column matching a field keeps it.
    pub fn map_columns(&self, header: &[Cell]) -> ColumnMap {
        let mut map = ColumnMap::default();

        for (index, cell) in header.iter().enumerate() {
            let text = cell.as_text().trim().to_lowercase();
            if text.is_empty() {
                continue;
            }

            let field = self
                .fields
                .iter()
                .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k.as_str())))
                .map(|(field, _)| *field);

            let slot = match field {
                Some(Field::Code) => &mut map.code,
                Some(Field::Name) => &mut map.name,
                Some(Field::SystemQty) => &mut map.system_qty,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(index);
            }
        }

        if map.is_empty() {
            tracing::debug!("no header columns recognized, using fallback layout");
            return ColumnMap::FALLBACK;
        }
        map
    }
}
