//! Search, filter and sort over a record set

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Drug;

/// Optional narrowing applied after search; all enabled flags must hold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFilters {
    pub show_only_shortage: bool,
    pub show_only_surplus: bool,
    pub show_only_counted: bool,
    pub show_only_uncounted: bool,
}

impl InventoryFilters {
    pub fn matches(&self, drug: &Drug) -> bool {
        (!self.show_only_shortage || drug.difference() < 0.0)
            && (!self.show_only_surplus || drug.difference() > 0.0)
            && (!self.show_only_counted || drug.physical_qty() > 0.0)
            && (!self.show_only_uncounted || drug.physical_qty() == 0.0)
    }
}

/// Case-insensitive substring match on name or code. A blank query matches all.
pub fn matches_query(drug: &Drug, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    drug.name.to_lowercase().contains(&query) || drug.code.to_lowercase().contains(&query)
}

/// Display ordering for list views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Keep stored (import) order
    #[default]
    None,
    Code,
    Name,
    Difference,
    Stock,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(SortBy::None),
            "code" => Ok(SortBy::Code),
            "name" => Ok(SortBy::Name),
            "difference" | "diff" => Ok(SortBy::Difference),
            "stock" => Ok(SortBy::Stock),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

impl SortBy {
    /// Stable sort in place
    pub fn sort(&self, drugs: &mut [Drug]) {
        match self {
            SortBy::None => {}
            SortBy::Code => drugs.sort_by(|a, b| a.code.cmp(&b.code)),
            SortBy::Name => drugs.sort_by(|a, b| a.name.cmp(&b.name)),
            SortBy::Difference => drugs.sort_by(|a, b| {
                a.difference()
                    .partial_cmp(&b.difference())
                    .unwrap_or(Ordering::Equal)
            }),
            SortBy::Stock => drugs.sort_by(|a, b| {
                let a = a.stock.unwrap_or(0.0);
                let b = b.stock.unwrap_or(0.0);
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }),
        }
    }
}
