//! Unified error handling for `embedding-service`.
//!
//! A single top-level error type [`EmbeddingServiceError`] covers the whole
//! library; configuration problems live in the nested [`ConfigError`]. Small
//! helpers for reading/validating configuration values return the unified
//! [`Result<T>`] alias.
//!
//! All messages include the suffix `[Embedding Service]` to simplify attribution in logs.

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, EmbeddingServiceError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `embedding-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EmbeddingServiceError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The config was built for a different provider than the client.
    #[error("[Embedding Service] invalid provider: expected {expected}")]
    InvalidProvider {
        /// Provider the client implements.
        expected: &'static str,
    },

    /// Endpoint is empty or does not start with http/https.
    #[error("[Embedding Service] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Underlying HTTP transport error (connect, timeout, body read).
    #[error("[Embedding Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Non-successful HTTP status from upstream.
    #[error("[Embedding Service] unexpected HTTP status {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body.
        snippet: String,
    },

    /// Response payload could not be decoded as expected.
    #[error("[Embedding Service] failed to decode response: {0}")]
    Decode(String),
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variable is missing or empty.
    #[error("[Embedding Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (ports, timeouts, dimensions).
    #[error("[Embedding Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `OLLAMA_PORT`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u16`).
        reason: &'static str,
    },

    /// Unsupported provider in `EMBEDDING_PROVIDER`.
    #[error("[Embedding Service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[Embedding Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `OLLAMA_URL`).
        var: &'static str,
        /// Explanation.
        reason: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Lookup helpers                                                            */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty variable through `lookup`.
///
/// # Errors
/// Returns [`ConfigError::MissingVar`] if the variable is absent or blank.
pub fn must_var<F>(lookup: &F, name: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Fetches an optional variable (`None` if unset or blank).
pub fn opt_var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u64` (`Ok(None)` if unset/blank).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if set but not a valid `u64`.
pub fn opt_u64<F>(lookup: &F, name: &'static str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match opt_var(lookup, name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            }
            .into()
        }),
        None => Ok(None),
    }
}

/// Parses an optional `usize` (`Ok(None)` if unset/blank).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if set but not a valid `usize`.
pub fn opt_usize<F>(lookup: &F, name: &'static str) -> Result<Option<usize>>
where
    F: Fn(&str) -> Option<String>,
{
    match opt_var(lookup, name) {
        Some(v) => v.parse::<usize>().map(Some).map_err(|_| {
            ConfigError::InvalidNumber {
                var: name,
                reason: "expected unsigned integer",
            }
            .into()
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] otherwise.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Trims a response body to a short single-line snippet for error messages.
pub fn make_snippet(body: &str) -> String {
    body.chars()
        .take(240)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn must_var_rejects_blank() {
        let l = lookup(&[("A", "  ")]);
        let err = must_var(&l, "A").unwrap_err();
        assert!(matches!(
            err,
            EmbeddingServiceError::Config(ConfigError::MissingVar("A"))
        ));
    }

    #[test]
    fn opt_u64_parses_or_fails() {
        let l = lookup(&[("T", "30"), ("BAD", "x")]);
        assert_eq!(opt_u64(&l, "T").unwrap(), Some(30));
        assert_eq!(opt_u64(&l, "MISSING").unwrap(), None);
        assert!(opt_u64(&l, "BAD").is_err());
    }

    #[test]
    fn snippet_is_single_line_and_bounded() {
        let body = "line1\nline2\n".repeat(100);
        let s = make_snippet(&body);
        assert_eq!(s.chars().count(), 240);
        assert!(!s.contains('\n'));
    }
}
