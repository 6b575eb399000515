//! Batch evaluation of clean results against ground truth.

use std::collections::BTreeMap;

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::models::config::EvalConfig;
use crate::models::fields::{CleanResult, FieldKind};

use super::ground_truth::GroundTruthStore;
use super::metrics::{compare_values, EvaluationReport, FieldMetric, MatchOutcome};

/// Per-field running counters.
#[derive(Debug, Clone, Copy, Default)]
struct FieldTally {
    exact: usize,
    partial: usize,
    missing_predictions: usize,
    missing_ground_truth: usize,
    compared: usize,
}

impl FieldTally {
    fn merge(self, other: Self) -> Self {
        Self {
            exact: self.exact + other.exact,
            partial: self.partial + other.partial,
            missing_predictions: self.missing_predictions + other.missing_predictions,
            missing_ground_truth: self.missing_ground_truth + other.missing_ground_truth,
            compared: self.compared + other.compared,
        }
    }
}

/// Counters for a batch (or a slice of one).
///
/// Merging is an associative, commutative sum, so partial tallies from
/// parallel workers combine deterministically in any completion order.
#[derive(Debug, Clone, Copy, Default)]
struct BatchTally {
    fields: [FieldTally; 6],
    confidence_sum: f64,
    confidence_count: usize,
}

impl BatchTally {
    fn merge(self, other: Self) -> Self {
        let mut fields = [FieldTally::default(); 6];
        for (i, slot) in fields.iter_mut().enumerate() {
            *slot = self.fields[i].merge(other.fields[i]);
        }
        Self {
            fields,
            confidence_sum: self.confidence_sum + other.confidence_sum,
            confidence_count: self.confidence_count + other.confidence_count,
        }
    }
}

/// Compares batches of post-processed results against ground truth.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    /// Create an evaluator with the given configuration.
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// Evaluate a batch of results against the ground-truth store.
    ///
    /// Records are compared independently and in parallel; an empty batch
    /// yields an all-zero report rather than a division error.
    pub fn evaluate(&self, results: &[CleanResult], store: &GroundTruthStore) -> EvaluationReport {
        let tally = results
            .par_iter()
            .map(|result| self.tally_record(result, store))
            .reduce(BatchTally::default, BatchTally::merge);

        let mut field_metrics = BTreeMap::new();
        let mut accuracy_sum = 0.0;
        let mut extraction_sum = 0.0;

        for (i, kind) in FieldKind::ALL.into_iter().enumerate() {
            let t = tally.fields[i];

            let matched = if self.config.partial_counts_as_match {
                t.exact + t.partial
            } else {
                t.exact
            };
            let accuracy = ratio(matched, t.compared);
            let extraction_rate = ratio(t.compared - t.missing_predictions, t.compared);

            accuracy_sum += accuracy;
            extraction_sum += extraction_rate;

            field_metrics.insert(
                kind.as_str().to_string(),
                FieldMetric {
                    accuracy,
                    extraction_rate,
                    exact_matches: t.exact,
                    partial_matches: t.partial,
                    missing_predictions: t.missing_predictions,
                    missing_ground_truth: t.missing_ground_truth,
                    total_compared: t.compared,
                },
            );
        }

        let field_count = FieldKind::ALL.len() as f64;
        let overall_accuracy = accuracy_sum / field_count;
        let overall_extraction_rate = extraction_sum / field_count;
        let avg_confidence = if tally.confidence_count == 0 {
            0.0
        } else {
            tally.confidence_sum / tally.confidence_count as f64
        };

        info!(
            "evaluation complete: {:.1}% accuracy on {} samples",
            overall_accuracy * 100.0,
            results.len()
        );

        EvaluationReport {
            field_metrics,
            overall_accuracy,
            overall_extraction_rate,
            avg_confidence,
            total_samples: results.len(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    fn tally_record(&self, result: &CleanResult, store: &GroundTruthStore) -> BatchTally {
        let mut tally = BatchTally::default();

        let truth = store.get(&result.source_file);
        if truth.is_none() {
            debug!("no ground truth for: {}", result.source_file);
        }

        for (i, kind) in FieldKind::ALL.into_iter().enumerate() {
            let Some(field) = result.fields.iter().find(|f| f.kind == kind) else {
                continue;
            };

            // Confidence is tracked for every field, independent of
            // whether the prediction turns out to be correct.
            tally.confidence_sum += field.confidence as f64;
            tally.confidence_count += 1;

            let slot = &mut tally.fields[i];

            let Some(truth) = truth else {
                slot.missing_ground_truth += 1;
                continue;
            };

            let expected = truth.value(kind).trim();
            let predicted = field.normalized_value.trim();
            slot.compared += 1;

            if expected.is_empty() && predicted.is_empty() {
                // Both correctly identified the field as absent.
                slot.exact += 1;
            } else if predicted.is_empty() {
                slot.missing_predictions += 1;
            } else {
                match compare_values(predicted, expected, kind, &self.config) {
                    MatchOutcome::Exact => slot.exact += 1,
                    MatchOutcome::Partial => slot.partial += 1,
                    MatchOutcome::Mismatch => {}
                }
            }
        }

        tally
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvalConfig::default())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::ground_truth::GroundTruthRecord;
    use crate::models::fields::{RawExtraction, RawField};
    use crate::process::PostProcessor;
    use pretty_assertions::assert_eq;

    fn clean_result(source_file: &str, values: [&str; 6]) -> CleanResult {
        let fields = FieldKind::ALL
            .into_iter()
            .zip(values)
            .map(|(kind, value)| RawField::new(kind, value, 0.8))
            .collect();
        let raw = RawExtraction::new(source_file, fields);
        PostProcessor::default().process(&raw)
    }

    fn truth(source_file: &str) -> GroundTruthRecord {
        GroundTruthRecord {
            source_file: source_file.to_string(),
            invoice_number: "INV-2024-001".to_string(),
            invoice_date: "2024-01-15".to_string(),
            vendor_name: "Acme Corporation".to_string(),
            customer_name: "XYZ Industries".to_string(),
            total_amount: "1250.00".to_string(),
            payment_due_date: "2024-02-15".to_string(),
        }
    }

    #[test]
    fn test_empty_batch() {
        let report = Evaluator::default().evaluate(&[], &GroundTruthStore::from_records(vec![]));

        assert_eq!(report.total_samples, 0);
        assert_eq!(report.overall_accuracy, 0.0);
        assert_eq!(report.overall_extraction_rate, 0.0);
        assert_eq!(report.avg_confidence, 0.0);
        assert_eq!(report.field_metrics.len(), 6);
        for metric in report.field_metrics.values() {
            assert_eq!(metric.total_compared, 0);
            assert_eq!(metric.accuracy, 0.0);
        }
    }

    #[test]
    fn test_perfect_extraction() {
        let store = GroundTruthStore::from_records(vec![truth("a.pdf")]);
        let results = vec![clean_result(
            "a.pdf",
            [
                "INV-2024-001",
                "15/01/2024",
                "Acme Corporation",
                "XYZ Industries",
                "$1,250.00",
                "2024-02-15",
            ],
        )];

        let report = Evaluator::default().evaluate(&results, &store);

        assert_eq!(report.overall_accuracy, 1.0);
        assert_eq!(report.overall_extraction_rate, 1.0);
        let metric = &report.field_metrics["total_amount"];
        assert_eq!(metric.exact_matches, 1);
        assert_eq!(metric.total_compared, 1);
    }

    #[test]
    fn test_missing_prediction_and_both_empty() {
        let mut gt = truth("a.pdf");
        gt.customer_name = String::new();

        let store = GroundTruthStore::from_records(vec![gt]);
        // Customer name empty on both sides; vendor name extracted nothing.
        let results = vec![clean_result(
            "a.pdf",
            ["INV-2024-001", "2024-01-15", "", "", "1250.00", "2024-02-15"],
        )];

        let report = Evaluator::default().evaluate(&results, &store);

        let vendor = &report.field_metrics["vendor_name"];
        assert_eq!(vendor.missing_predictions, 1);
        assert_eq!(vendor.exact_matches, 0);
        assert_eq!(vendor.extraction_rate, 0.0);

        let customer = &report.field_metrics["customer_name"];
        assert_eq!(customer.exact_matches, 1);
        assert_eq!(customer.accuracy, 1.0);
    }

    #[test]
    fn test_missing_ground_truth_excluded() {
        let store = GroundTruthStore::from_records(vec![truth("a.pdf")]);
        let results = vec![
            clean_result(
                "a.pdf",
                [
                    "INV-2024-001",
                    "2024-01-15",
                    "Acme Corporation",
                    "XYZ Industries",
                    "1250.00",
                    "2024-02-15",
                ],
            ),
            clean_result(
                "unknown.pdf",
                ["X-1", "2024-03-01", "Foo", "Bar", "10.00", "2024-04-01"],
            ),
        ];

        let report = Evaluator::default().evaluate(&results, &store);

        let metric = &report.field_metrics["invoice_number"];
        assert_eq!(metric.total_compared, 1);
        assert_eq!(metric.missing_ground_truth, 1);
        assert_eq!(metric.accuracy, 1.0);
        assert_eq!(report.total_samples, 2);
    }

    #[test]
    fn test_partial_match_not_in_accuracy_by_default() {
        let mut gt = truth("a.pdf");
        gt.vendor_name = "Acme Corporation Ltd".to_string();

        let store = GroundTruthStore::from_records(vec![gt.clone()]);
        let results = vec![clean_result(
            "a.pdf",
            [
                "INV-2024-001",
                "2024-01-15",
                "Acme Corporation",
                "XYZ Industries",
                "1250.00",
                "2024-02-15",
            ],
        )];

        let report = Evaluator::default().evaluate(&results, &store);
        let vendor = &report.field_metrics["vendor_name"];
        assert_eq!(vendor.partial_matches, 1);
        assert_eq!(vendor.exact_matches, 0);
        assert_eq!(vendor.accuracy, 0.0);

        // Explicitly configured, partial matches fold into accuracy.
        let lenient = Evaluator::new(EvalConfig {
            partial_counts_as_match: true,
            ..EvalConfig::default()
        });
        let report = lenient.evaluate(&results, &store);
        assert_eq!(report.field_metrics["vendor_name"].accuracy, 1.0);
    }

    #[test]
    fn test_split_batch_counters_sum_to_whole() {
        let store = GroundTruthStore::from_records(vec![
            truth("a.pdf"),
            truth("b.pdf"),
            truth("c.pdf"),
        ]);

        let results = vec![
            clean_result(
                "a.pdf",
                [
                    "INV-2024-001",
                    "2024-01-15",
                    "Acme Corporation",
                    "XYZ Industries",
                    "1250.00",
                    "2024-02-15",
                ],
            ),
            clean_result(
                "b.pdf",
                ["WRONG", "2024-01-15", "Acme Corp", "", "999.00", "2024-02-15"],
            ),
            clean_result(
                "c.pdf",
                ["INV-2024-001", "not a date", "Acme Corporation", "XYZ", "", ""],
            ),
        ];

        let evaluator = Evaluator::default();
        let whole = evaluator.evaluate(&results, &store);
        let first = evaluator.evaluate(&results[..1], &store);
        let second = evaluator.evaluate(&results[1..], &store);

        for kind in FieldKind::ALL {
            let w = &whole.field_metrics[kind.as_str()];
            let a = &first.field_metrics[kind.as_str()];
            let b = &second.field_metrics[kind.as_str()];

            assert_eq!(w.exact_matches, a.exact_matches + b.exact_matches);
            assert_eq!(w.partial_matches, a.partial_matches + b.partial_matches);
            assert_eq!(
                w.missing_predictions,
                a.missing_predictions + b.missing_predictions
            );
            assert_eq!(
                w.missing_ground_truth,
                a.missing_ground_truth + b.missing_ground_truth
            );
            assert_eq!(w.total_compared, a.total_compared + b.total_compared);
        }
    }

    #[test]
    fn test_avg_confidence_independent_of_correctness() {
        let store = GroundTruthStore::from_records(vec![truth("a.pdf")]);
        let results = vec![clean_result(
            "a.pdf",
            ["WRONG", "1999-01-01", "Nobody", "Nothing", "1.00", "1999-01-02"],
        )];

        let report = Evaluator::default().evaluate(&results, &store);

        // All predictions are wrong, but confidence still averages 0.8.
        assert!((report.avg_confidence - 0.8).abs() < 1e-6);
    }
}
