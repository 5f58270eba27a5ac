//! Error types for the voyage pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in any pipeline stage
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration file does not exist
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Configuration document is not valid YAML
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Configuration file exists but could not be read
    #[error("Failed to load configuration {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A required parameter is absent from its stage namespace
    #[error("Missing parameter `{key}` in namespace `{namespace}`")]
    MissingParam { namespace: String, key: String },

    /// A parameter is present but has the wrong type or range
    #[error("Parameter `{key}` in namespace `{namespace}` is invalid: expected {expected}")]
    InvalidParam {
        namespace: String,
        key: String,
        expected: &'static str,
    },

    /// The ingestion source could not be reached or read
    #[error("Data source unreachable: {0}")]
    SourceUnreachable(String),

    /// Tabular content is malformed
    #[error("Failed to parse dataset: {0}")]
    DatasetParse(String),

    /// A cleaning or encoding transformation failed
    #[error("Preprocessing failed: {0}")]
    Preprocess(String),

    /// Training input is malformed (absent label, non-numeric feature, ...)
    #[error("Invalid training input: {0}")]
    TrainingValue(String),

    /// Training failed for a reason other than malformed input
    #[error("Training failed: {0}")]
    Training(String),

    /// The model artifact does not exist at the given path
    #[error("Model artifact not found: {0}")]
    ModelNotFound(PathBuf),

    /// The evaluation dataset lacks a column the model was trained with
    #[error("Schema mismatch: expected column `{0}` is absent")]
    SchemaMismatch(String),

    /// Evaluation failed for a reason other than a schema mismatch
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
