use thiserror::Error;

#[derive(Error, Debug)]
pub enum FabricaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Model request error: {0}")]
    Model(String),

    #[error("Unusable model output: {0}")]
    Parse(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Batch organization error: {0}")]
    Batch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl FabricaError {
    /// Transport failures and malformed model output are worth another attempt;
    /// everything else (credentials, configuration, local IO) is fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Model(_) | Self::Parse(_) | Self::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FabricaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(FabricaError::Parse("missing titulo".into()).is_retryable());
        assert!(FabricaError::Model("502 Bad Gateway".into()).is_retryable());
        assert!(!FabricaError::MissingCredential("OPENAI_API_KEY".into()).is_retryable());
        assert!(!FabricaError::Config("videos_per_batch must be > 0".into()).is_retryable());
    }
}
