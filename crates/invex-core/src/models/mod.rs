//! Data models for extraction results and configuration.

pub mod config;
pub mod fields;

pub use config::{AmountConfig, DateConfig, EvalConfig, InvexConfig, ValidateConfig};
pub use fields::{CleanResult, FieldKind, NormalizedField, RawExtraction, RawField};
