//! Error types for Vertex AI Imagen operations.

#[derive(Debug, thiserror::Error)]
pub enum VertexError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Vertex AI error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Generation error: {0}")]
    GenerationError(String),
}

impl VertexError {
    /// Whether the failure is transient and worth another attempt.
    ///
    /// Config, auth, serialization, and domain failures are permanent;
    /// retrying them only delays the same error to the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            VertexError::NetworkError(_) => true,
            VertexError::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, VertexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(VertexError::ApiError {
            status: 429,
            message: "quota".into()
        }
        .is_retryable());
        assert!(VertexError::ApiError {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());

        assert!(!VertexError::ApiError {
            status: 400,
            message: "bad request".into()
        }
        .is_retryable());
        assert!(!VertexError::ConfigError("missing project".into()).is_retryable());
        assert!(!VertexError::AuthError("bad token".into()).is_retryable());
        assert!(!VertexError::GenerationError("no data".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = VertexError::ApiError {
            status: 404,
            message: "model not found".into(),
        };
        assert_eq!(err.to_string(), "Vertex AI error: 404 - model not found");

        let err = VertexError::ConfigError("LOCATION is required".into());
        assert_eq!(err.to_string(), "Configuration error: LOCATION is required");
    }
}
