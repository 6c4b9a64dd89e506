//! Aggregate counts over a record set

use serde::{Deserialize, Serialize};

use super::Drug;

/// Inventory statistics for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_items: usize,
    pub counted_items: usize,
    /// Counted records whose difference is zero; uncounted records never match
    pub matched_items: usize,
    pub shortage_items: usize,
    pub surplus_items: usize,
    /// Signed sum of all differences
    pub total_difference: f64,
}

impl InventoryStats {
    pub fn compute(drugs: &[Drug]) -> Self {
        drugs.iter().fold(Self::default(), |mut stats, drug| {
            let difference = drug.difference();
            stats.total_items += 1;
            if drug.is_counted() {
                stats.counted_items += 1;
                if difference == 0.0 {
                    stats.matched_items += 1;
                }
            }
            if difference < 0.0 {
                stats.shortage_items += 1;
            } else if difference > 0.0 {
                stats.surplus_items += 1;
            }
            stats.total_difference += difference;
            stats
        })
    }

    pub fn uncounted_items(&self) -> usize {
        self.total_items - self.counted_items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counted(code: &str, system: f64, physical: f64) -> Drug {
        let mut drug = Drug::new(code, format!("Drug {code}"), system);
        if physical > 0.0 {
            drug.set_physical_qty(physical);
        }
        drug
    }

    #[test]
    fn test_stats_scenario() {
        let drugs = vec![
            counted("A", 100.0, 80.0),
            counted("B", 50.0, 70.0),
            counted("C", 200.0, 0.0),
        ];

        let stats = InventoryStats::compute(&drugs);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.counted_items, 2);
        assert_eq!(stats.shortage_items, 1);
        assert_eq!(stats.surplus_items, 1);
        assert_eq!(stats.matched_items, 0);
        assert_eq!(stats.total_difference, 0.0);
        assert_eq!(stats.uncounted_items(), 1);
    }

    #[test]
    fn test_matched_requires_positive_count() {
        let drugs = vec![counted("A", 10.0, 10.0), counted("B", 10.0, 0.0)];
        let stats = InventoryStats::compute(&drugs);
        assert_eq!(stats.matched_items, 1);
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(InventoryStats::compute(&[]), InventoryStats::default());
    }
}
