//! Post-processing of raw extraction results.

use tracing::debug;

use crate::models::config::InvexConfig;
use crate::models::fields::{CleanResult, FieldKind, NormalizedField, RawExtraction, RawField};
use crate::normalize::{clean_name, clean_text, AmountNormalizer, DateNormalizer};
use crate::validate::FieldValidator;

/// Orchestrates normalization and validation across the six fields of
/// one extraction result.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    dates: DateNormalizer,
    amounts: AmountNormalizer,
    validator: FieldValidator,
}

impl PostProcessor {
    /// Create a post-processor from pipeline configuration.
    pub fn new(config: &InvexConfig) -> Self {
        Self {
            dates: DateNormalizer::new(config.date.clone()),
            amounts: AmountNormalizer::new(config.amount.clone()),
            validator: FieldValidator::new(config.validate.clone()),
        }
    }

    /// Post-process one extraction result.
    ///
    /// Total over its input: any combination of present, absent, or
    /// malformed fields yields a six-field [`CleanResult`]. A field that
    /// fails to normalize degrades into flags and a warning instead of
    /// aborting; its raw value is preserved for audit.
    pub fn process(&self, raw: &RawExtraction) -> CleanResult {
        let mut warnings = Vec::new();

        let mut fields: Vec<NormalizedField> = FieldKind::ALL
            .into_iter()
            .map(|kind| {
                let raw_field = raw
                    .field(kind)
                    .cloned()
                    .unwrap_or_else(|| RawField::empty(kind));
                self.process_field(&raw_field, &mut warnings)
            })
            .collect();

        // Cross-field advisory, after both dates normalized independently.
        self.check_date_order(&mut fields, &mut warnings);

        let success = fields.iter().all(|f| f.normalization_ok);

        debug!(
            source_file = %raw.source_file,
            extracted = fields.iter().filter(|f| f.is_extracted()).count(),
            warnings = warnings.len(),
            "post-processing complete"
        );

        CleanResult {
            source_file: raw.source_file.clone(),
            extraction_timestamp: raw.extraction_timestamp.clone(),
            model_name: raw.model_name.clone(),
            fields,
            success,
            warnings,
        }
    }

    fn process_field(&self, raw: &RawField, warnings: &mut Vec<String>) -> NormalizedField {
        let trimmed = raw.raw_value.trim();

        let (normalized_value, normalization_ok) = if trimmed.is_empty() {
            // Nothing to normalize; validation reports the gap.
            (String::new(), true)
        } else if raw.kind.is_date() {
            match self.dates.normalize(trimmed) {
                Some(canonical) => (canonical, true),
                None => {
                    warnings.push(format!("could not normalize {}: '{}'", raw.kind, trimmed));
                    (String::new(), false)
                }
            }
        } else if raw.kind.is_amount() {
            match self.amounts.normalize(trimmed) {
                Some(canonical) => (canonical, true),
                None => {
                    warnings.push(format!("could not normalize {}: '{}'", raw.kind, trimmed));
                    (String::new(), false)
                }
            }
        } else if raw.kind == FieldKind::InvoiceNumber {
            (clean_text(trimmed), true)
        } else {
            (clean_name(trimmed), true)
        };

        let validation = self.validator.validate(raw.kind, &normalized_value);

        NormalizedField {
            kind: raw.kind,
            raw_value: raw.raw_value.clone(),
            normalized_value,
            confidence: raw.confidence.clamp(0.0, 1.0),
            normalization_ok,
            validation_ok: validation.ok,
            validation_reason: validation.reason,
        }
    }

    fn check_date_order(&self, fields: &mut [NormalizedField], warnings: &mut Vec<String>) {
        let invoice_date = fields
            .iter()
            .find(|f| f.kind == FieldKind::InvoiceDate)
            .map(|f| f.normalized_value.clone())
            .unwrap_or_default();

        let Some(due) = fields
            .iter_mut()
            .find(|f| f.kind == FieldKind::PaymentDueDate)
        else {
            return;
        };

        if let Some(reason) = self
            .validator
            .check_date_order(&invoice_date, &due.normalized_value)
        {
            warnings.push(reason.clone());
            due.validation_reason = Some(match due.validation_reason.take() {
                Some(existing) => format!("{existing}; {reason}"),
                None => reason,
            });
        }
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new(&InvexConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_extraction(values: [(&str, f32); 6]) -> RawExtraction {
        let fields = FieldKind::ALL
            .into_iter()
            .zip(values)
            .map(|(kind, (value, confidence))| RawField::new(kind, value, confidence))
            .collect();
        RawExtraction::new("invoice_001.pdf", fields)
    }

    #[test]
    fn test_full_result_normalizes() {
        let raw = raw_extraction([
            ("INV-2024-001.", 0.95),
            ("15/01/2024", 0.9),
            ("ACME CORPORATION", 0.85),
            ("Customer: XYZ Industries", 0.8),
            ("$1,234.56", 0.92),
            ("Feb 15, 2024", 0.7),
        ]);

        let clean = PostProcessor::default().process(&raw);

        assert_eq!(clean.fields.len(), 6);
        assert!(clean.success);
        assert_eq!(
            clean.field(FieldKind::InvoiceNumber).normalized_value,
            "INV-2024-001"
        );
        assert_eq!(clean.field(FieldKind::InvoiceDate).normalized_value, "2024-01-15");
        assert_eq!(
            clean.field(FieldKind::VendorName).normalized_value,
            "Acme Corporation"
        );
        assert_eq!(
            clean.field(FieldKind::CustomerName).normalized_value,
            "XYZ Industries"
        );
        assert_eq!(clean.field(FieldKind::TotalAmount).normalized_value, "1234.56");
        assert_eq!(
            clean.field(FieldKind::PaymentDueDate).normalized_value,
            "2024-02-15"
        );
        assert!(clean.fields.iter().all(|f| f.validation_ok));
    }

    #[test]
    fn test_total_on_all_empty_input() {
        let raw = raw_extraction([("", 0.0); 6]);
        let clean = PostProcessor::default().process(&raw);

        assert_eq!(clean.fields.len(), 6);
        // Nothing failed to normalize, but every field fails validation.
        assert!(clean.success);
        assert!(clean.fields.iter().all(|f| f.normalization_ok));
        assert!(clean.fields.iter().all(|f| !f.validation_ok));
        assert!(clean.fields.iter().all(|f| !f.is_extracted()));
    }

    #[test]
    fn test_total_on_missing_fields() {
        // Structurally incomplete input still yields six fields.
        let raw = RawExtraction::new(
            "invoice_002.pdf",
            vec![RawField::new(FieldKind::InvoiceNumber, "INV-7", 0.9)],
        );

        let clean = PostProcessor::default().process(&raw);

        assert_eq!(clean.fields.len(), 6);
        assert_eq!(clean.field(FieldKind::VendorName).normalized_value, "");
        assert_eq!(clean.field(FieldKind::InvoiceNumber).normalized_value, "INV-7");
    }

    #[test]
    fn test_malformed_fields_degrade() {
        let raw = raw_extraction([
            ("INV-1", 0.9),
            ("not a date", 0.4),
            ("Acme", 0.9),
            ("XYZ Industries", 0.9),
            ("no amount", 0.3),
            ("", 0.0),
        ]);

        let clean = PostProcessor::default().process(&raw);

        assert!(!clean.success);
        let date = clean.field(FieldKind::InvoiceDate);
        assert!(!date.normalization_ok);
        assert_eq!(date.normalized_value, "");
        assert_eq!(date.raw_value, "not a date");

        let amount = clean.field(FieldKind::TotalAmount);
        assert!(!amount.normalization_ok);
        assert_eq!(amount.raw_value, "no amount");

        assert_eq!(clean.warnings.len(), 2);
    }

    #[test]
    fn test_date_order_advisory() {
        let raw = raw_extraction([
            ("INV-1", 0.9),
            ("2024-02-15", 0.9),
            ("Acme", 0.9),
            ("XYZ", 0.9),
            ("100.00", 0.9),
            ("2024-01-15", 0.9),
        ]);

        let clean = PostProcessor::default().process(&raw);

        let due = clean.field(FieldKind::PaymentDueDate);
        // Advisory only: the value survives and normalization succeeded.
        assert_eq!(due.normalized_value, "2024-01-15");
        assert!(due.normalization_ok);
        assert_eq!(
            due.validation_reason.as_deref(),
            Some("payment due date precedes invoice date")
        );
        assert!(clean
            .warnings
            .iter()
            .any(|w| w.contains("precedes invoice date")));
    }

    #[test]
    fn test_confidence_clamped() {
        let raw = raw_extraction([
            ("INV-1", 1.7),
            ("2024-01-15", -0.2),
            ("Acme", 0.5),
            ("XYZ", 0.5),
            ("100.00", 0.5),
            ("2024-02-15", 0.5),
        ]);

        let clean = PostProcessor::default().process(&raw);

        assert_eq!(clean.field(FieldKind::InvoiceNumber).confidence, 1.0);
        assert_eq!(clean.field(FieldKind::InvoiceDate).confidence, 0.0);
    }
}
