//! Unified error hierarchy for omniPD
//!
//! Structured error types for the engine's outer surfaces (curve loading,
//! configuration, CLI), with severity classification and user-facing
//! messages. The engine modules themselves use local error enums wrapped
//! in `anyhow`, and surface here at the application boundary.

use thiserror::Error;

use crate::models::CurveError;

/// Top-level error type for omniPD operations
#[derive(Debug, Error)]
pub enum OmniPdError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Curve validation errors
    #[error("Invalid curve: {0}")]
    Curve(#[from] CurveError),

    /// Calculation errors
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for omniPD operations
pub type Result<T> = std::result::Result<T, OmniPdError>;

impl OmniPdError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            OmniPdError::Curve(_) => ErrorSeverity::Warning,
            OmniPdError::Calculation(_) => ErrorSeverity::Warning,
            OmniPdError::Csv(_) => ErrorSeverity::Error,
            OmniPdError::Io(_) => ErrorSeverity::Error,
            OmniPdError::Configuration(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            OmniPdError::Curve(CurveError::Empty) => {
                "The power curve contains no samples. Record some efforts first.".to_string()
            }
            OmniPdError::Curve(err) => {
                format!("The power curve could not be read: {err}")
            }
            OmniPdError::Calculation(reason) => {
                format!("Not enough usable power data to fit the CP model: {reason}")
            }
            OmniPdError::Csv(err) => {
                format!("Could not parse the curve file: {err}")
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Warning that the caller can act on (e.g. insufficient data)
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
