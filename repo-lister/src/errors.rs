//! Crate-wide error hierarchy for repo-lister.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ListerResult<T> = Result<T, ListerError>;

/// Root error type for the repo-lister crate.
#[derive(Debug, Error)]
pub enum ListerError {
    /// Provider (GitHub/GitLab) related failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Manifest (file I/O / JSON) failure.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration problems (bad/missing tokens, base URL, etc.).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input validation errors (bad owner/repo, empty extension set, etc.).
    #[error("validation error: {0}")]
    Validation(String),
}

impl ListerError {
    /// True when the provider rejected the credential.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Provider(ProviderError::Unauthorized | ProviderError::Forbidden)
        )
    }

    /// True when the owner/repository/path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Provider(ProviderError::NotFound))
    }

    /// True when the provider throttled the caller.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Provider(ProviderError::RateLimited { .. }))
    }
}

/// Provider-specific error used inside the provider layer.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403 without rate-limit signals).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429, or 403 with exhausted quota).
    #[error("rate limited")]
    RateLimited {
        /// Optional `Retry-After` hint in seconds when available.
        retry_after_secs: Option<u64>,
    },

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (non-2xx) not covered by specific variants.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Manifest file errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// I/O error while reading or writing the manifest.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required provider access token.
    #[error("missing provider token")]
    MissingToken,

    /// Invalid base API URL.
    #[error("invalid base api url: {0}")]
    InvalidBaseUrl(String),

    /// Unknown provider name.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
}

// ===== Conversions for `?` ergonomics at the crate root =====

impl From<reqwest::Error> for ListerError {
    fn from(e: reqwest::Error) -> Self {
        ListerError::Provider(ProviderError::from(e))
    }
}

impl From<std::io::Error> for ListerError {
    fn from(e: std::io::Error) -> Self {
        ListerError::Manifest(ManifestError::Io(e))
    }
}

impl From<serde_json::Error> for ListerError {
    fn from(e: serde_json::Error) -> Self {
        ListerError::Manifest(ManifestError::Serde(e))
    }
}

// ===== Mapping from reqwest::Error into ProviderError =====

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }

        if e.is_decode() {
            return ProviderError::InvalidResponse(e.to_string());
        }

        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 => ProviderError::Unauthorized,
                403 => ProviderError::Forbidden,
                404 => ProviderError::NotFound,
                429 => ProviderError::RateLimited {
                    retry_after_secs: None,
                },
                500..=599 => ProviderError::Server(code),
                _ => ProviderError::HttpStatus(code),
            };
        }

        ProviderError::Network(e.to_string())
    }
}
