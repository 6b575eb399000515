//! Field metrics, the evaluation report, and value comparison.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::config::EvalConfig;
use crate::models::fields::FieldKind;

/// Metrics for a single field across a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMetric {
    /// Exact-match accuracy over compared records.
    pub accuracy: f64,

    /// Fraction of compared records with a non-empty prediction.
    pub extraction_rate: f64,

    /// Predictions equal to ground truth after canonicalization.
    pub exact_matches: usize,

    /// Predictions at or above the similarity threshold but not exact.
    pub partial_matches: usize,

    /// Records where ground truth exists but the prediction is empty.
    pub missing_predictions: usize,

    /// Records with no ground-truth entry for this source file.
    pub missing_ground_truth: usize,

    /// Records that entered comparison (ground truth present).
    pub total_compared: usize,
}

/// Complete evaluation results. Built once, immutable, serializable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Per-field metrics keyed by field name.
    pub field_metrics: BTreeMap<String, FieldMetric>,

    /// Mean exact-match accuracy, fields weighted equally.
    pub overall_accuracy: f64,

    /// Mean extraction rate, fields weighted equally.
    pub overall_extraction_rate: f64,

    /// Mean confidence over every field of every record, independent of
    /// correctness.
    pub avg_confidence: f64,

    /// Number of results evaluated.
    pub total_samples: usize,

    /// When the evaluation finished (RFC 3339).
    pub timestamp: String,
}

impl EvaluationReport {
    /// Render a plain-text report for terminal output.
    pub fn render_text(&self) -> String {
        let mut lines = vec![
            "=".repeat(60),
            "EXTRACTION EVALUATION REPORT".to_string(),
            "=".repeat(60),
            format!("Timestamp: {}", self.timestamp),
            format!("Total Samples: {}", self.total_samples),
            "-".repeat(60),
            String::new(),
            "OVERALL METRICS:".to_string(),
            format!("  Accuracy:        {:.1}%", self.overall_accuracy * 100.0),
            format!(
                "  Extraction Rate: {:.1}%",
                self.overall_extraction_rate * 100.0
            ),
            format!("  Avg Confidence:  {:.2}", self.avg_confidence),
            String::new(),
            "-".repeat(60),
            "FIELD-LEVEL METRICS:".to_string(),
            String::new(),
        ];

        for (name, m) in &self.field_metrics {
            lines.extend([
                format!("  {name}:"),
                format!("    Accuracy:        {:.1}%", m.accuracy * 100.0),
                format!("    Extraction Rate: {:.1}%", m.extraction_rate * 100.0),
                format!("    Exact/Partial:   {}/{}", m.exact_matches, m.partial_matches),
                format!(
                    "    Compared:        {} (missing predictions: {}, missing ground truth: {})",
                    m.total_compared, m.missing_predictions, m.missing_ground_truth
                ),
                String::new(),
            ]);
        }

        lines.push("=".repeat(60));
        lines.join("\n")
    }
}

/// Outcome of comparing one prediction to one ground-truth value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchOutcome {
    Exact,
    Partial,
    Mismatch,
}

/// Compare a non-empty prediction to a ground-truth value.
///
/// Exact equality (after canonicalization) short-circuits; otherwise a
/// normalized edit-distance similarity decides, with the threshold
/// inclusive for partial matches.
pub(crate) fn compare_values(
    predicted: &str,
    truth: &str,
    kind: FieldKind,
    config: &EvalConfig,
) -> MatchOutcome {
    let p = canonicalize(predicted, kind, config.case_sensitive);
    let t = canonicalize(truth, kind, config.case_sensitive);

    if p == t {
        return MatchOutcome::Exact;
    }

    if string_similarity(&p, &t) >= config.partial_threshold {
        MatchOutcome::Partial
    } else {
        MatchOutcome::Mismatch
    }
}

/// Canonicalize a value for comparison.
///
/// Amounts compare as decimals when they parse (so trailing zeros are
/// ignored); dates compare on their digit sequence only (so separator
/// style is ignored).
fn canonicalize(value: &str, kind: FieldKind, case_sensitive: bool) -> String {
    let mut v = value.split_whitespace().collect::<Vec<_>>().join(" ");

    if !case_sensitive {
        v = v.to_lowercase();
    }

    if kind.is_amount() {
        let stripped: String = v
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
            .collect();
        let dotted = stripped.replace(',', ".");
        match Decimal::from_str(&dotted) {
            Ok(d) => d.normalize().to_string(),
            Err(_) => dotted,
        }
    } else if kind.is_date() {
        v.chars().filter(|c| c.is_ascii_digit()).collect()
    } else {
        v
    }
}

/// Similarity as `1 - edit_distance / max_len`, in [0, 1].
pub(crate) fn string_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let distance = levenshtein(&a, &b);
    let max_len = a.len().max(b.len());

    1.0 - distance as f64 / max_len as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            current[j + 1] = (prev[j + 1] + 1).min(current[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}
