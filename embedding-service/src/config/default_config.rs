//! Embedding model config loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! Common:
//! - `EMBEDDING_PROVIDER`     = `ollama` (default) or `openai`
//! - `EMBEDDING_MODEL`        = embedding model name (mandatory)
//! - `EMBEDDING_TIMEOUT_SECS` = optional request timeout (u64)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//!
//! OpenAI-specific:
//! - `OPENAI_URL`     = endpoint (default `https://api.openai.com`)
//! - `OPENAI_API_KEY` = bearer key (mandatory)

use crate::{
    config::{embedding_model_config::EmbeddingModelConfig, embedding_provider::EmbeddingProvider},
    error_handler::{
        ConfigError, EmbeddingServiceError, must_var, opt_u64, opt_var, validate_http_endpoint,
    },
};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Builds the embedding config from the process environment.
///
/// # Errors
/// See [`config_embedding_from_lookup`].
pub fn config_embedding_from_env() -> Result<EmbeddingModelConfig, EmbeddingServiceError> {
    config_embedding_from_lookup(|name| std::env::var(name).ok())
}

/// Builds the embedding config from an arbitrary variable source.
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] for a missing model, endpoint or API key
/// - [`ConfigError::UnsupportedProvider`] for an unknown `EMBEDDING_PROVIDER`
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::InvalidFormat`] for bad values
pub fn config_embedding_from_lookup<F>(
    lookup: F,
) -> Result<EmbeddingModelConfig, EmbeddingServiceError>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = match opt_var(&lookup, "EMBEDDING_PROVIDER") {
        Some(raw) => raw.parse::<EmbeddingProvider>()?,
        None => EmbeddingProvider::Ollama,
    };
    let model = must_var(&lookup, "EMBEDDING_MODEL")?;
    let timeout_secs = opt_u64(&lookup, "EMBEDDING_TIMEOUT_SECS")?;

    let (endpoint, api_key) = match provider {
        EmbeddingProvider::Ollama => (ollama_endpoint(&lookup)?, None),
        EmbeddingProvider::OpenAI => {
            let endpoint =
                opt_var(&lookup, "OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
            validate_http_endpoint("OPENAI_URL", &endpoint)?;
            (endpoint, Some(must_var(&lookup, "OPENAI_API_KEY")?))
        }
    };

    Ok(EmbeddingModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        timeout_secs,
    })
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint<F>(lookup: &F) -> Result<String, EmbeddingServiceError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = opt_var(lookup, "OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = opt_var(lookup, "OLLAMA_PORT") {
        port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "OLLAMA_PORT",
            reason: "expected u16 (1..=65535)",
        })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn ollama_is_default_and_port_builds_localhost() {
        let cfg = config_embedding_from_lookup(vars(&[
            ("EMBEDDING_MODEL", "nomic-embed-text"),
            ("OLLAMA_PORT", "11434"),
        ]))
        .unwrap();
        assert_eq!(cfg.provider, EmbeddingProvider::Ollama);
        assert_eq!(cfg.endpoint, "http://localhost:11434");
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.timeout_secs(), 60);
    }

    #[test]
    fn ollama_url_wins_over_port() {
        let cfg = config_embedding_from_lookup(vars(&[
            ("EMBEDDING_MODEL", "m"),
            ("OLLAMA_URL", "http://gpu-box:11434"),
            ("OLLAMA_PORT", "1"),
            ("EMBEDDING_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.endpoint, "http://gpu-box:11434");
        assert_eq!(cfg.timeout_secs, Some(5));
    }

    #[test]
    fn openai_requires_key_and_defaults_url() {
        let err = config_embedding_from_lookup(vars(&[
            ("EMBEDDING_PROVIDER", "openai"),
            ("EMBEDDING_MODEL", "text-embedding-3-small"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            EmbeddingServiceError::Config(ConfigError::MissingVar("OPENAI_API_KEY"))
        ));

        let cfg = config_embedding_from_lookup(vars(&[
            ("EMBEDDING_PROVIDER", "openai"),
            ("EMBEDDING_MODEL", "text-embedding-3-small"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();
        assert_eq!(cfg.endpoint, "https://api.openai.com");
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn missing_endpoint_and_bad_port_are_reported() {
        let err = config_embedding_from_lookup(vars(&[("EMBEDDING_MODEL", "m")])).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingServiceError::Config(ConfigError::MissingVar(_))
        ));

        let err = config_embedding_from_lookup(vars(&[
            ("EMBEDDING_MODEL", "m"),
            ("OLLAMA_PORT", "99999"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            EmbeddingServiceError::Config(ConfigError::InvalidNumber { var: "OLLAMA_PORT", .. })
        ));
    }
}
