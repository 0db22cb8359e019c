//! Error types for Sentra

/// Result type alias using Sentra's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Sentra operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model artifact could not be loaded; fatal at startup
    #[error("artifact load error: {0}")]
    ArtifactLoad(String),

    /// Malformed or missing request fields; rejected before reaching the model
    #[error("validation error: {0}")]
    Validation(String),

    /// The model failed while scoring a request
    #[error("inference error: {0}")]
    Inference(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new artifact load error
    pub fn artifact_load(msg: impl Into<String>) -> Self {
        Self::ArtifactLoad(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the caller is at fault (4xx) rather than the service (5xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short machine-readable kind, used for error payloads and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactLoad(_) => "artifact_load_error",
            Self::Validation(_) => "validation_error",
            Self::Inference(_) => "inference_error",
            Self::Config(_) => "config_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(Error::validation("missing field `text`").is_client_error());
        assert!(!Error::inference("forward pass failed").is_client_error());
        assert!(!Error::artifact_load("no such file").is_client_error());
    }

    #[test]
    fn test_error_kind_and_display() {
        let err = Error::inference("bad shape");
        assert_eq!(err.kind(), "inference_error");
        assert_eq!(err.to_string(), "inference error: bad shape");
    }

    #[test]
    fn test_every_kind_is_distinct() {
        let kinds = [
            Error::artifact_load("x").kind(),
            Error::validation("x").kind(),
            Error::inference("x").kind(),
            Error::config("x").kind(),
        ];
        assert_eq!(
            kinds,
            [
                "artifact_load_error",
                "validation_error",
                "inference_error",
                "config_error"
            ]
        );
        assert!(!Error::config("unknown device").is_client_error());
    }
}
