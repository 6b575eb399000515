//! Evaluation of post-processed results against ground truth.

pub mod evaluator;
pub mod ground_truth;
pub mod metrics;

pub use evaluator::Evaluator;
pub use ground_truth::{GroundTruthRecord, GroundTruthStore, GroundTruthSummary};
pub use metrics::{EvaluationReport, FieldMetric};
