//! Merge incoming records into an existing set
//!
//! Pure functions: no storage access, no clock other than id generation.

use std::collections::HashSet;

use crate::domain::Drug;

/// Outcome of [`reconcile`]
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// `existing` followed by the accepted incoming records
    pub merged: Vec<Drug>,
    pub imported_count: usize,
    /// Incoming records dropped because their code was already taken
    pub duplicate_count: usize,
}

impl Reconciliation {
    /// Incoming records were offered but every one was a duplicate
    pub fn all_duplicates(&self) -> bool {
        self.imported_count == 0 && self.duplicate_count > 0
    }
}

/// Append incoming records whose code is not yet present.
///
/// Codes are compared exactly after normalization. A code repeated inside
/// `incoming` is accepted once. Each accepted record gets a fresh id that
/// does not collide with any id in `existing`.
pub fn reconcile(existing: Vec<Drug>, incoming: Vec<Drug>) -> Reconciliation {
    let mut codes: HashSet<String> = existing.iter().map(|d| d.code.clone()).collect();
    let mut ids: HashSet<String> = existing.iter().map(|d| d.id.clone()).collect();

    let mut merged = existing;
    let mut imported_count = 0;
    let mut duplicate_count = 0;

    for mut drug in incoming {
        if !codes.insert(drug.code.clone()) {
            duplicate_count += 1;
            continue;
        }

        drug.id = Drug::generate_id(&drug.code);
        while ids.contains(&drug.id) {
            drug.id = Drug::generate_id(&drug.code);
        }
        ids.insert(drug.id.clone());

        merged.push(drug);
        imported_count += 1;
    }

    Reconciliation {
        merged,
        imported_count,
        duplicate_count,
    }
}

/// Drop records whose id was already seen, keeping the first occurrence
pub fn dedupe_by_id(drugs: Vec<Drug>) -> Vec<Drug> {
    let mut seen = HashSet::new();
    drugs
        .into_iter()
        .filter(|drug| seen.insert(drug.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drug(code: &str) -> Drug {
        Drug::new(code, format!("Drug {code}"), 10.0)
    }

    fn codes(drugs: &[Drug]) -> Vec<&str> {
        drugs.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn test_new_codes_are_appended() {
        let result = reconcile(vec![drug("A")], vec![drug("B"), drug("C")]);
        assert_eq!(codes(&result.merged), vec!["A", "B", "C"]);
        assert_eq!(result.imported_count, 2);
        assert_eq!(result.duplicate_count, 0);
        assert!(!result.all_duplicates());
    }

    #[test]
    fn test_existing_codes_are_skipped() {
        let existing = vec![drug("A"), drug("B")];
        let result = reconcile(existing.clone(), vec![drug("A"), drug("C"), drug("B")]);
        assert_eq!(codes(&result.merged), vec!["A", "B", "C"]);
        assert_eq!(result.imported_count, 1);
        assert_eq!(result.duplicate_count, 2);
        // Existing records are untouched
        assert_eq!(result.merged[..2], existing[..]);
    }

    #[test]
    fn test_all_duplicates() {
        let existing = vec![drug("A")];
        let result = reconcile(existing, vec![drug("A")]);
        assert!(result.all_duplicates());
        assert_eq!(result.merged.len(), 1);

        let result = reconcile(vec![drug("A")], Vec::new());
        assert!(!result.all_duplicates());
    }

    #[test]
    fn test_duplicates_within_incoming_batch() {
        let result = reconcile(Vec::new(), vec![drug("A"), drug("A"), drug("B")]);
        assert_eq!(codes(&result.merged), vec!["A", "B"]);
        assert_eq!(result.duplicate_count, 1);
    }

    #[test]
    fn test_accepted_records_get_fresh_ids() {
        let incoming = drug("A");
        let original_id = incoming.id.clone();
        let mut existing = drug("Z");
        existing.id = original_id.clone();

        let result = reconcile(vec![existing], vec![incoming]);
        let ids: HashSet<&str> = result.merged.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(result.merged[1].id, original_id);
        assert!(result.merged[1].id.starts_with("drug_A_"));
    }

    #[test]
    fn test_dedupe_by_id_keeps_first() {
        let first = drug("A");
        let mut second = drug("B");
        second.id = first.id.clone();
        let third = drug("C");

        let deduped = dedupe_by_id(vec![first, second, third]);
        assert_eq!(codes(&deduped), vec!["A", "C"]);
    }
}
