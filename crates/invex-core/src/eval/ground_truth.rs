//! Ground-truth loading and indexing.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EvalError;
use crate::models::fields::FieldKind;

/// Expected values for one source document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundTruthRecord {
    /// Key: the source file this record describes.
    pub source_file: String,

    pub invoice_number: String,
    pub invoice_date: String,
    pub vendor_name: String,
    pub customer_name: String,
    pub total_amount: String,
    pub payment_due_date: String,
}

impl GroundTruthRecord {
    /// Expected value for a field kind; empty means "correctly absent".
    pub fn value(&self, kind: FieldKind) -> &str {
        match kind {
            FieldKind::InvoiceNumber => &self.invoice_number,
            FieldKind::InvoiceDate => &self.invoice_date,
            FieldKind::VendorName => &self.vendor_name,
            FieldKind::CustomerName => &self.customer_name,
            FieldKind::TotalAmount => &self.total_amount,
            FieldKind::PaymentDueDate => &self.payment_due_date,
        }
    }
}

/// Accepts both `{"records": [...]}` and a bare top-level array.
#[derive(Deserialize)]
#[serde(untagged)]
enum GroundTruthFile {
    Wrapped { records: Vec<GroundTruthRecord> },
    Bare(Vec<GroundTruthRecord>),
}

/// Completeness scan over loaded ground truth.
#[derive(Debug, Clone, Serialize)]
pub struct GroundTruthSummary {
    /// Total number of records.
    pub total_records: usize,
    /// Records with all six expected values present.
    pub complete_records: usize,
    /// Per-field count of empty expected values.
    pub missing_by_field: BTreeMap<String, usize>,
}

/// Ground-truth records indexed by source-file identity.
///
/// Loaded once per evaluation run; read-only afterwards.
#[derive(Debug, Clone)]
pub struct GroundTruthStore {
    records: Vec<GroundTruthRecord>,
    index: HashMap<String, usize>,
}

impl GroundTruthStore {
    /// Load ground truth from a JSON file.
    ///
    /// A missing or malformed file is the one hard failure of the
    /// evaluation path and surfaces as [`EvalError`].
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        if !path.exists() {
            return Err(EvalError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let parsed: GroundTruthFile =
            serde_json::from_str(&content).map_err(|e| EvalError::Malformed(e.to_string()))?;

        let records = match parsed {
            GroundTruthFile::Wrapped { records } => records,
            GroundTruthFile::Bare(records) => records,
        };

        for (index, record) in records.iter().enumerate() {
            if record.source_file.trim().is_empty() {
                return Err(EvalError::MissingKey { index });
            }
        }

        let store = Self::from_records(records);
        info!(
            "loaded {} ground truth records from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Build a store from already-parsed records.
    ///
    /// Duplicate `source_file` keys resolve last-one-wins; each collision
    /// is logged because the intent behind it is ambiguous.
    pub fn from_records(records: Vec<GroundTruthRecord>) -> Self {
        let mut index = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            if let Some(prev) = index.insert(record.source_file.clone(), i) {
                warn!(
                    "duplicate ground truth for '{}': record {} replaces record {}",
                    record.source_file, i, prev
                );
            }

            // Index by bare file name too, so predictions carrying a full
            // path still join.
            let name = bare_file_name(&record.source_file);
            if name != record.source_file {
                index.insert(name, i);
            }
        }

        Self { records, index }
    }

    /// Look up the record for a source file, by exact value first, then
    /// by bare file name.
    pub fn get(&self, source_file: &str) -> Option<&GroundTruthRecord> {
        if let Some(&i) = self.index.get(source_file) {
            return Some(&self.records[i]);
        }

        let name = bare_file_name(source_file);
        self.index.get(&name).map(|&i| &self.records[i])
    }

    /// All loaded records.
    pub fn records(&self) -> &[GroundTruthRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Scan records for empty expected values.
    pub fn validate_records(&self) -> GroundTruthSummary {
        let mut missing_by_field: BTreeMap<String, usize> = BTreeMap::new();
        let mut complete_records = 0;

        for record in &self.records {
            let mut complete = true;
            for kind in FieldKind::ALL {
                if record.value(kind).trim().is_empty() {
                    complete = false;
                    *missing_by_field.entry(kind.as_str().to_string()).or_default() += 1;
                }
            }
            if complete {
                complete_records += 1;
            }
        }

        GroundTruthSummary {
            total_records: self.records.len(),
            complete_records,
            missing_by_field,
        }
    }
}

fn bare_file_name(source_file: &str) -> String {
    Path::new(source_file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_file.to_string())
}
