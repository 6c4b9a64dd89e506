//! Drug domain model - one inventory line tracked through system and physical counts

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::messages::Locale;

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// A single inventory line
///
/// Quantities are private so that `difference` can only change together with
/// them: it is `0` for a freshly created record and `physical_qty - system_qty`
/// after any quantity update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredDrug")]
pub struct Drug {
    pub id: String,
    pub code: String,
    pub name: String,
    system_qty: f64,
    physical_qty: f64,
    difference: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Drug {
    /// Create an uncounted record with a fresh id
    pub fn new(code: impl Into<String>, name: impl Into<String>, system_qty: f64) -> Self {
        let code = code.into();
        Self {
            id: Self::generate_id(&code),
            code,
            name: name.into(),
            system_qty,
            physical_qty: 0.0,
            difference: 0.0,
            notes: None,
            stock: None,
            category: None,
            unit: None,
            created_at: Some(Utc::now().to_rfc3339()),
        }
    }

    /// Generate a record id: `drug_<code>_<unix-ms>_<9 base36 chars>`
    pub fn generate_id(code: &str) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())] as char)
            .collect();
        format!("drug_{}_{}_{}", code, Utc::now().timestamp_millis(), suffix)
    }

    pub fn system_qty(&self) -> f64 {
        self.system_qty
    }

    pub fn physical_qty(&self) -> f64 {
        self.physical_qty
    }

    pub fn difference(&self) -> f64 {
        self.difference
    }

    /// A record counts as counted once a positive physical quantity is entered
    pub fn is_counted(&self) -> bool {
        self.physical_qty > 0.0
    }

    pub fn set_physical_qty(&mut self, qty: f64) {
        self.physical_qty = qty;
        self.recompute_difference();
    }

    pub fn set_system_qty(&mut self, qty: f64) {
        self.system_qty = qty;
        self.recompute_difference();
    }

    fn recompute_difference(&mut self) {
        self.difference = self.physical_qty - self.system_qty;
    }

    /// Apply a user edit. Quantities must be finite and non-negative.
    pub fn apply(&mut self, update: DrugUpdate, locale: Locale) -> super::Result<()> {
        for qty in [update.physical_qty, update.system_qty, update.stock].into_iter().flatten() {
            if !is_valid_quantity(qty) {
                return Err(super::Error::validation(locale.invalid_quantity()));
            }
        }

        if let Some(qty) = update.system_qty {
            self.system_qty = qty;
        }
        if let Some(qty) = update.physical_qty {
            self.physical_qty = qty;
        }
        if update.system_qty.is_some() || update.physical_qty.is_some() {
            self.recompute_difference();
        }
        if let Some(notes) = update.notes {
            self.notes = if notes.trim().is_empty() { None } else { Some(notes) };
        }
        if let Some(stock) = update.stock {
            self.stock = Some(stock);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(unit) = update.unit {
            self.unit = Some(unit);
        }
        Ok(())
    }

    /// Reconciliation status derived from `difference`
    pub fn status(&self) -> DrugStatus {
        DrugStatus::from_difference(self.difference)
    }
}

/// Quantities accepted anywhere in the system
pub fn is_valid_quantity(qty: f64) -> bool {
    qty.is_finite() && qty >= 0.0
}

/// Partial update entered by the user during counting
#[derive(Debug, Clone, Default)]
pub struct DrugUpdate {
    pub physical_qty: Option<f64>,
    pub system_qty: Option<f64>,
    pub notes: Option<String>,
    pub stock: Option<f64>,
    pub category: Option<String>,
    pub unit: Option<String>,
}

impl DrugUpdate {
    pub fn physical(qty: f64) -> Self {
        Self {
            physical_qty: Some(qty),
            ..Self::default()
        }
    }
}

/// Outcome of comparing physical and system quantities
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrugStatus {
    Matched,
    Surplus(f64),
    Shortage(f64),
}

impl DrugStatus {
    pub fn from_difference(difference: f64) -> Self {
        if difference > 0.0 {
            DrugStatus::Surplus(difference.abs())
        } else if difference < 0.0 {
            DrugStatus::Shortage(difference.abs())
        } else {
            DrugStatus::Matched
        }
    }

    pub fn label(&self, locale: Locale) -> String {
        match self {
            DrugStatus::Matched => locale.status_matched().to_string(),
            DrugStatus::Surplus(amount) => locale.status_surplus(*amount),
            DrugStatus::Shortage(amount) => locale.status_shortage(*amount),
        }
    }
}

/// Persisted shape; older data may omit quantities or carry a stale difference
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDrug {
    id: String,
    code: String,
    name: String,
    #[serde(default)]
    system_qty: Option<f64>,
    #[serde(default)]
    physical_qty: Option<f64>,
    #[serde(default)]
    difference: Option<f64>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    stock: Option<f64>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<StoredDrug> for Drug {
    fn from(stored: StoredDrug) -> Self {
        let system_qty = stored.system_qty.unwrap_or(0.0);
        let physical_qty = stored.physical_qty.unwrap_or(0.0);
        let stored_difference = stored.difference.unwrap_or(0.0);
        let quantities_touched = physical_qty != 0.0 || stored_difference != 0.0;
        let difference = if quantities_touched {
            physical_qty - system_qty
        } else {
            0.0
        };

        Self {
            id: stored.id,
            code: stored.code,
            name: stored.name,
            system_qty,
            physical_qty,
            difference,
            notes: stored.notes,
            stock: stored.stock,
            category: stored.category,
            unit: stored.unit,
            created_at: stored.created_at,
        }
    }
}
