//! Error types and exit codes for skyindex
//!
//! Exit codes used by command-line callers:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage or validation error (bad flags, out-of-range values)
//! - 3: Data/model error (missing identity, unreadable or mismatched model file)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for skyindex callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage or validation error (2)
    Usage = 2,
    /// Data/model error (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during skyindex operations
#[derive(Error, Debug)]
pub enum SkyError {
    // Validation errors (exit code 2)
    #[error("rating must be between 0 and 5, got {value}")]
    InvalidRating { value: f64 },

    #[error("feature weight must be between 0 and 1, got {value}")]
    InvalidFeatureWeight { value: f64 },

    #[error("{context} identifier cannot be empty")]
    EmptyIdentifier { context: String },

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("{axis} out of range: {value} (expected {range})")]
    InvalidCoordinate {
        axis: String,
        value: f64,
        range: String,
    },

    #[error("{0}")]
    UsageError(String),

    // Data/model errors (exit code 3)
    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("model error for {path:?}: {reason}")]
    Model { path: PathBuf, reason: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl SkyError {
    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        SkyError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an identity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        SkyError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a failed model file operation
    pub fn model(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        SkyError::Model {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an error for a missing row field
    pub fn missing_field(field: &str) -> Self {
        SkyError::MissingField {
            field: field.to_string(),
        }
    }

    /// Whether this error is a validation failure raised at the offending call
    pub fn is_validation(&self) -> bool {
        self.exit_code() == ExitCode::Usage
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SkyError::InvalidRating { .. }
            | SkyError::InvalidFeatureWeight { .. }
            | SkyError::EmptyIdentifier { .. }
            | SkyError::InvalidValue { .. }
            | SkyError::MissingField { .. }
            | SkyError::InvalidCoordinate { .. }
            | SkyError::UsageError(_) => ExitCode::Usage,

            SkyError::NotFound { .. } | SkyError::Model { .. } => ExitCode::Data,

            SkyError::Io(_) | SkyError::Json(_) | SkyError::Toml(_) | SkyError::Other(_) => {
                ExitCode::Failure
            }
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            SkyError::InvalidRating { .. } => "invalid_rating",
            SkyError::InvalidFeatureWeight { .. } => "invalid_feature_weight",
            SkyError::EmptyIdentifier { .. } => "empty_identifier",
            SkyError::InvalidValue { .. } => "invalid_value",
            SkyError::MissingField { .. } => "missing_field",
            SkyError::InvalidCoordinate { .. } => "invalid_coordinate",
            SkyError::UsageError(_) => "usage_error",
            SkyError::NotFound { .. } => "not_found",
            SkyError::Model { .. } => "model_error",
            SkyError::Io(_) => "io_error",
            SkyError::Json(_) => "json_error",
            SkyError::Toml(_) => "toml_error",
            SkyError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for skyindex operations
pub type Result<T> = std::result::Result<T, SkyError>;
