//! OpenAI (or OpenAI-compatible) embeddings client.
//!
//! Endpoint derived from `EmbeddingModelConfig::endpoint`:
//! - POST {endpoint}/v1/embeddings
//!
//! Constructor validation:
//! - `cfg.provider` must be `EmbeddingProvider::OpenAI`
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::{
    embedding_model_config::EmbeddingModelConfig, embedding_provider::EmbeddingProvider,
};
use crate::error_handler::{ConfigError, EmbeddingServiceError, Result, make_snippet};

/// Thin client for the OpenAI embeddings API.
///
/// Keeps a preconfigured `reqwest::Client` (timeout + bearer header).
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: EmbeddingModelConfig,
    url_embeddings: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`EmbeddingServiceError::InvalidProvider`] if `cfg.provider` is not OpenAI
    /// - [`ConfigError::MissingVar`] if `cfg.api_key` is `None`
    /// - [`EmbeddingServiceError::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`EmbeddingServiceError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: EmbeddingModelConfig) -> Result<Self> {
        if cfg.provider != EmbeddingProvider::OpenAI {
            return Err(EmbeddingServiceError::InvalidProvider { expected: "openai" });
        }

        let api_key = cfg
            .api_key
            .clone()
            .ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(EmbeddingServiceError::InvalidEndpoint(cfg.endpoint.clone()));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                EmbeddingServiceError::Decode(format!("invalid API key header: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs()))
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_embeddings = format!("{}/v1/embeddings", base);

        debug!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = cfg.timeout_secs(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_embeddings,
        })
    }

    /// Model this client embeds with.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Retrieves a single embeddings vector via `/v1/embeddings`.
    ///
    /// # Errors
    /// - [`EmbeddingServiceError::HttpStatus`] for non-2xx responses
    /// - [`EmbeddingServiceError::HttpTransport`] for client/network failures
    /// - [`EmbeddingServiceError::Decode`] if the JSON cannot be parsed or `data` is empty
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>> {
        let started = Instant::now();
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input,
        };

        debug!(
            model = %self.cfg.model,
            input_len = input.len(),
            "POST {}", self.url_embeddings
        );

        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embeddings.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI /v1/embeddings returned non-success status"
            );

            return Err(EmbeddingServiceError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            EmbeddingServiceError::Decode(format!("serde error: {e}; expected `data[0].embedding`"))
        })?;

        let first = out.data.into_iter().next().ok_or_else(|| {
            EmbeddingServiceError::Decode("empty `data` in embeddings response".into())
        })?;

        debug!(
            model = %self.cfg.model,
            dim = first.embedding.len(),
            latency_ms = started.elapsed().as_millis(),
            "embeddings completed"
        );

        Ok(first.embedding)
    }
}

/// Request body for `/v1/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response body for `/v1/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}
