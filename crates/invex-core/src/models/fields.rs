//! Field-level data models for the post-processing pipeline.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// The six invoice header fields the pipeline operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Invoice number/identifier.
    InvoiceNumber,
    /// Date the invoice was issued.
    InvoiceDate,
    /// Name of the seller/vendor.
    VendorName,
    /// Name of the buyer/customer.
    CustomerName,
    /// Total amount due.
    TotalAmount,
    /// Payment due date.
    PaymentDueDate,
}

impl FieldKind {
    /// All field kinds in canonical order.
    ///
    /// This ordering is the invariant shape of every [`CleanResult`] and
    /// the column order of flat exports.
    pub const ALL: [FieldKind; 6] = [
        FieldKind::InvoiceNumber,
        FieldKind::InvoiceDate,
        FieldKind::VendorName,
        FieldKind::CustomerName,
        FieldKind::TotalAmount,
        FieldKind::PaymentDueDate,
    ];

    /// Stable snake_case name used in JSON and report keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::InvoiceNumber => "invoice_number",
            FieldKind::InvoiceDate => "invoice_date",
            FieldKind::VendorName => "vendor_name",
            FieldKind::CustomerName => "customer_name",
            FieldKind::TotalAmount => "total_amount",
            FieldKind::PaymentDueDate => "payment_due_date",
        }
    }

    /// Whether this field holds a date.
    pub fn is_date(&self) -> bool {
        matches!(self, FieldKind::InvoiceDate | FieldKind::PaymentDueDate)
    }

    /// Whether this field holds a monetary amount.
    pub fn is_amount(&self) -> bool {
        matches!(self, FieldKind::TotalAmount)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field as produced by the extraction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawField {
    /// Which invoice field this is; `name` on the wire.
    #[serde(rename = "name")]
    pub kind: FieldKind,

    /// Best-effort extracted string; empty when nothing was found.
    /// Collaborators may send `null`, which reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub raw_value: String,

    /// Model confidence for this field (0.0 - 1.0).
    #[serde(default)]
    pub confidence: f32,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawField {
    /// Create a raw field.
    pub fn new(kind: FieldKind, raw_value: impl Into<String>, confidence: f32) -> Self {
        Self {
            kind,
            raw_value: raw_value.into(),
            confidence,
        }
    }

    /// An empty field for a kind the collaborator produced nothing for.
    pub fn empty(kind: FieldKind) -> Self {
        Self::new(kind, "", 0.0)
    }
}

/// A full per-document output of the extraction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExtraction {
    /// Source file the fields were extracted from.
    pub source_file: String,

    /// When extraction was performed (collaborator-supplied, opaque).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_timestamp: Option<String>,

    /// Name of the model that produced the fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    /// The extracted fields.
    pub fields: Vec<RawField>,
}

impl RawExtraction {
    /// Create an extraction result from collaborator fields.
    pub fn new(source_file: impl Into<String>, fields: Vec<RawField>) -> Self {
        Self {
            source_file: source_file.into(),
            extraction_timestamp: None,
            model_name: None,
            fields,
        }
    }

    /// Check that each of the six field kinds appears exactly once.
    ///
    /// This is the structural-validity boundary: deserialized input that
    /// fails here is rejected before processing starts.
    pub fn ensure_complete(&self) -> Result<(), InputError> {
        for kind in FieldKind::ALL {
            match self.fields.iter().filter(|f| f.kind == kind).count() {
                0 => return Err(InputError::MissingField(kind.as_str().to_string())),
                1 => {}
                _ => return Err(InputError::DuplicateField(kind.as_str().to_string())),
            }
        }
        Ok(())
    }

    /// Look up a field by kind.
    pub fn field(&self, kind: FieldKind) -> Option<&RawField> {
        self.fields.iter().find(|f| f.kind == kind)
    }
}

/// One field after normalization and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedField {
    /// Which invoice field this is; `name` on the wire.
    #[serde(rename = "name")]
    pub kind: FieldKind,

    /// Original collaborator output, preserved for audit.
    pub raw_value: String,

    /// Canonical value; empty when extraction or normalization failed.
    pub normalized_value: String,

    /// Model confidence, clamped to 0.0 - 1.0.
    pub confidence: f32,

    /// Whether normalization succeeded (trivially true for empty input).
    pub normalization_ok: bool,

    /// Whether the normalized value passed validation.
    pub validation_ok: bool,

    /// Human-readable validation finding, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_reason: Option<String>,
}

impl NormalizedField {
    /// Whether a non-empty prediction was produced for this field.
    pub fn is_extracted(&self) -> bool {
        !self.normalized_value.is_empty()
    }
}

/// A fully post-processed extraction result.
///
/// Invariant: `fields` always holds exactly six entries in the order of
/// [`FieldKind::ALL`], no matter how broken the input was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanResult {
    /// Source file the fields were extracted from.
    pub source_file: String,

    /// When extraction was performed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_timestamp: Option<String>,

    /// Name of the model that produced the fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    /// The six post-processed fields in canonical order.
    pub fields: Vec<NormalizedField>,

    /// True iff every non-empty raw field normalized successfully.
    pub success: bool,

    /// Issues encountered during processing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CleanResult {
    /// Look up a field by kind.
    ///
    /// Always succeeds on results built by the pipeline; the panic guards
    /// the six-field invariant against hand-built values.
    pub fn field(&self, kind: FieldKind) -> &NormalizedField {
        self.fields
            .iter()
            .find(|f| f.kind == kind)
            .expect("CleanResult invariant: all six fields present")
    }

    /// Number of fields with a non-empty prediction.
    pub fn extracted_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_extracted()).count()
    }

    /// Mean confidence over fields with a non-empty prediction.
    pub fn average_confidence(&self) -> f32 {
        let extracted: Vec<_> = self.fields.iter().filter(|f| f.is_extracted()).collect();
        if extracted.is_empty() {
            return 0.0;
        }
        extracted.iter().map(|f| f.confidence).sum::<f32>() / extracted.len() as f32
    }
}
