//! Error types for DupSift operations.
//!
//! Detection and profiling failures are local, pure-function failures: the
//! dataset is never partially mutated, and callers retry with corrected
//! input (for example a different column selection).

use thiserror::Error;

/// Main error type for DupSift operations.
#[derive(Debug, Error)]
pub enum DupSiftError {
    /// Column selection is empty or names columns the dataset doesn't have
    #[error("Invalid column selection: {reason}")]
    InvalidSelection { reason: String },

    /// A cell value could not be represented by any normalization rule.
    ///
    /// Recovered locally by falling back to the raw text of the value; the
    /// public analysis API never returns this variant.
    #[error("Unsupported cell value: {detail}")]
    UnsupportedType { detail: String },

    /// Input format is recognized but cannot be decoded
    #[error("Unsupported input format: {format}")]
    UnsupportedFormat { format: String },

    /// Rows and columns passed to a dataset don't line up
    #[error("Invalid dataset: {reason}")]
    InvalidDataset { reason: String },

    /// Delimited, JSON or workbook input could not be decoded
    #[error("Failed to parse input: {context}")]
    Parse {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with DupSiftError
pub type Result<T> = std::result::Result<T, DupSiftError>;

impl DupSiftError {
    /// Creates an invalid selection error
    pub fn invalid_selection(reason: impl Into<String>) -> Self {
        Self::InvalidSelection {
            reason: reason.into(),
        }
    }

    /// Creates an unsupported cell value error
    pub fn unsupported_type(detail: impl Into<String>) -> Self {
        Self::UnsupportedType {
            detail: detail.into(),
        }
    }

    /// Creates an unsupported input format error
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an invalid dataset error
    pub fn invalid_dataset(reason: impl Into<String>) -> Self {
        Self::InvalidDataset {
            reason: reason.into(),
        }
    }

    /// Creates a parse error with context
    pub fn parse_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = DupSiftError::invalid_selection("no columns selected");
        assert!(error.to_string().contains("no columns selected"));

        let error = DupSiftError::unsupported_format("xlsx");
        assert_eq!(error.to_string(), "Unsupported input format: xlsx");

        let error = DupSiftError::configuration("sample_size must be positive");
        assert!(error.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad byte");
        let error = DupSiftError::parse_failed("CSV record 3", io);

        assert!(error.to_string().contains("CSV record 3"));
        let source = std::error::Error::source(&error).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("bad byte"));
    }
}
