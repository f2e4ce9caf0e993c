//! Unified error hierarchy for fitimport
//!
//! Fatal conditions only: soft decode conditions travel as
//! `models::DecodeWarning` on the result instead of through this hierarchy.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for import operations
#[derive(Debug, Error)]
pub enum ImportError {
    /// Decoding failed after the file was read; the only fatal decode
    /// condition is a missing session message.
    #[error("import failed: {0}")]
    Decode(#[from] DecodeError),

    /// The byte-level FIT reader rejected the file
    #[error("unreadable FIT file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// No importer recognizes the file
    #[error("unsupported file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal decode-pass errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// No session/summary message found in the record stream
    #[error("no session message found in record stream")]
    MissingSummary,
}

/// Result type alias for fitimport operations
pub type Result<T> = std::result::Result<T, ImportError>;

impl ImportError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ImportError::UnsupportedFormat { .. } => ErrorSeverity::Warning,
            ImportError::Decode(_) | ImportError::Parse { .. } | ImportError::Io(_) => {
                ErrorSeverity::Error
            }
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ImportError::Decode(DecodeError::MissingSummary) => {
                "The file holds no activity summary, so nothing could be imported.".to_string()
            }
            ImportError::Parse { path, .. } => {
                format!("Could not read {} as a FIT file.", path.display())
            }
            ImportError::UnsupportedFormat { path } => {
                format!("No importer recognizes {}.", path.display())
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
    /// Warning that doesn't prevent other operations
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = ImportError::UnsupportedFormat {
            path: PathBuf::from("workout.xyz"),
        };
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = ImportError::Decode(DecodeError::MissingSummary);
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_user_messages() {
        let err = ImportError::Decode(DecodeError::MissingSummary);
        assert!(err.user_message().contains("no activity summary"));

        let err = ImportError::Parse {
            path: PathBuf::from("workout.fit"),
            reason: "bad header".to_string(),
        };
        assert!(err.user_message().contains("workout.fit"));
    }

    #[test]
    fn test_decode_error_wraps_into_import_error() {
        let err: ImportError = DecodeError::MissingSummary.into();
        assert!(matches!(
            err,
            ImportError::Decode(DecodeError::MissingSummary)
        ));
    }
}
