//! Core library for invoice extraction post-processing.
//!
//! This crate provides:
//! - Date and amount normalization to canonical forms
//! - Advisory per-field validation
//! - Post-processing of raw extraction results into clean results
//! - Evaluation of clean results against ground truth

pub mod error;
pub mod models;
pub mod normalize;
pub mod validate;
pub mod process;
pub mod eval;

pub use error::{EvalError, InputError, InvexError, Result};
pub use models::config::{AmountConfig, DateConfig, EvalConfig, InvexConfig, ValidateConfig};
pub use models::fields::{CleanResult, FieldKind, NormalizedField, RawExtraction, RawField};
pub use normalize::{AmountNormalizer, DateNormalizer};
pub use validate::{FieldValidator, Validation};
pub use process::PostProcessor;
pub use eval::{EvaluationReport, Evaluator, FieldMetric, GroundTruthRecord, GroundTruthStore};
