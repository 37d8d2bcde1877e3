//! Unified error types for the crate.

use embedding_service::EmbeddingServiceError;
use repo_lister::ListerError;
use thiserror::Error;

/// Top-level error for code-embedder operations.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Downloading file content failed (auth, not found, rate limit, transport).
    #[error("fetch error: {0}")]
    Fetch(#[from] ListerError),

    /// The embedding endpoint failed (transport, status, decode).
    #[error("encoder error: {0}")]
    Encoder(#[from] EmbeddingServiceError),

    /// Input or output of the encoder was unusable (bad text, bad vector).
    #[error("model error: {0}")]
    Model(String),

    /// Mismatch in vector dimensionality across files.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Storage collaborator failure (wrapped).
    #[error("sink error: {0}")]
    Sink(String),

    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl EmbedError {
    /// True for encoder-side failures: malformed input, encoder error or
    /// an unusable vector.
    pub fn is_model(&self) -> bool {
        matches!(
            self,
            Self::Encoder(_) | Self::Model(_) | Self::VectorSizeMismatch { .. }
        )
    }

    /// True when the failure came from downloading the file.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}
