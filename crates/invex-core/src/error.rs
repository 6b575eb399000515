//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// Ground-truth loading or evaluation error.
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// Structurally invalid extraction input.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to ground-truth files.
///
/// These are the only failures that abort an evaluation call; everything
/// else (unparsable fields, missing records) degrades into flags and
/// counters instead.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Ground-truth file does not exist.
    #[error("ground truth file not found: {0}")]
    FileNotFound(String),

    /// Ground-truth file could not be read.
    #[error("failed to read ground truth: {0}")]
    Read(#[from] std::io::Error),

    /// Ground-truth file is not valid JSON or has the wrong shape.
    #[error("malformed ground truth: {0}")]
    Malformed(String),

    /// A record has an empty `source_file` key and cannot be indexed.
    #[error("ground truth record {index} has no source_file")]
    MissingKey { index: usize },
}

/// Errors related to raw extraction input.
#[derive(Error, Debug)]
pub enum InputError {
    /// A required field kind is absent.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The same field kind appears more than once.
    #[error("duplicate field: {0}")]
    DuplicateField(String),
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
