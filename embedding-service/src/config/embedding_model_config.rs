use crate::config::embedding_provider::EmbeddingProvider;

/// Default request timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for one embedding model endpoint.
///
/// # Fields
///
/// - `provider`: which backend serves the model.
/// - `model`: model identifier (e.g., `"nomic-embed-text"`, `"text-embedding-3-small"`).
/// - `endpoint`: base URL of the server, without the API path.
/// - `api_key`: bearer key for providers that require authentication.
/// - `timeout_secs`: per-request timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingModelConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl EmbeddingModelConfig {
    /// Effective timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}
