//! Error types for the capgate orchestration layer.
//!
//! Errors are split by who is at fault: the caller (`ServiceError::Validation`),
//! the clock (`ServiceError::Timeout`), or a backend adapter (`AdapterError`).
//! Each maps to exactly one HTTP status at the server boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for capgate operations outside request handling.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Adapter construction errors (model loading, client setup)
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures raised by a backend adapter.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Model files could not be loaded at startup
    #[error("Failed to load model {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    /// Image decoding or inference failed
    #[error("{message}")]
    Classification { message: String },

    /// The generation backend failed or was unreachable
    #[error("{message}")]
    Generation {
        message: String,
        status_code: Option<u16>,
    },

    /// The OCR engine failed
    #[error("{message}")]
    Recognition { message: String },

    /// The adapter observed cancellation before producing a result
    #[error("Operation cancelled")]
    Cancelled,
}

/// Request-level failure taxonomy.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or invalid input; the message names the field.
    #[error("{0}")]
    Validation(String),

    /// The deadline elapsed or the caller went away before the adapter finished.
    #[error("Request timed out.")]
    Timeout,

    /// The adapter raised a failure.
    #[error("{0}")]
    Backend(#[from] AdapterError),

    /// One item of a batch failed, aborting the whole batch.
    #[error("Failed to classify {file}: {source}")]
    BatchItem {
        file: String,
        #[source]
        source: AdapterError,
    },
}

impl ServiceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Fold adapter-observed cancellation into the timeout outcome.
    pub(crate) fn from_adapter(err: AdapterError) -> Self {
        match err {
            AdapterError::Cancelled => Self::Timeout,
            other => Self::Backend(other),
        }
    }
}

/// Convenience type alias for gateway results.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Convenience type alias for adapter results.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Convenience type alias for request-handling results.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_is_short() {
        let err = ServiceError::from(AdapterError::Generation {
            message: "Ollama HTTP 500 Internal Server Error".to_string(),
            status_code: Some(500),
        });
        assert_eq!(err.to_string(), "Ollama HTTP 500 Internal Server Error");
    }

    #[test]
    fn test_cancelled_adapter_maps_to_timeout() {
        let err = ServiceError::from_adapter(AdapterError::Cancelled);
        assert!(matches!(err, ServiceError::Timeout));
        assert_eq!(err.to_string(), "Request timed out.");
    }

    #[test]
    fn test_batch_item_names_file() {
        let err = ServiceError::BatchItem {
            file: "broken.png".to_string(),
            source: AdapterError::Classification {
                message: "Cannot decode image".to_string(),
            },
        };
        assert_eq!(err.to_string(), "Failed to classify broken.png: Cannot decode image");
    }

    #[test]
    fn test_model_load_names_path() {
        let err = AdapterError::ModelLoad {
            path: PathBuf::from("models/resnet.onnx"),
            message: "not found".to_string(),
        };
        assert!(err.to_string().contains("models/resnet.onnx"));
    }
}
