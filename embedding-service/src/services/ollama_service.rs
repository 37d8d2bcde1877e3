//! Lightweight Ollama client for embeddings.
//!
//! - `POST {endpoint}/api/embeddings` with `{ model, prompt }`
//!   → `{ embedding: number[] }`
//!
//! # Examples
//!
//! ```no_run
//! use embedding_service::{EmbeddingModelConfig, EmbeddingProvider};
//! use embedding_service::services::ollama_service::OllamaService;
//!
//! # async fn demo() -> embedding_service::Result<()> {
//! let svc = OllamaService::new(EmbeddingModelConfig {
//!     provider: EmbeddingProvider::Ollama,
//!     model: "nomic-embed-text".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     api_key: None,
//!     timeout_secs: Some(30),
//! })?;
//! let vec = svc.embeddings("class Foo {}").await?;
//! println!("dimension = {}", vec.len());
//! # Ok(()) }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{
    embedding_model_config::EmbeddingModelConfig, embedding_provider::EmbeddingProvider,
};
use crate::error_handler::{EmbeddingServiceError, Result, make_snippet};

/// Thin client for Ollama embeddings.
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: EmbeddingModelConfig,
    url_embeddings: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - [`EmbeddingServiceError::InvalidProvider`] if `cfg.provider` is not `Ollama`
    /// - [`EmbeddingServiceError::InvalidEndpoint`] if `cfg.endpoint` is invalid
    /// - [`EmbeddingServiceError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: EmbeddingModelConfig) -> Result<Self> {
        if cfg.provider != EmbeddingProvider::Ollama {
            return Err(EmbeddingServiceError::InvalidProvider { expected: "ollama" });
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(EmbeddingServiceError::InvalidEndpoint(cfg.endpoint));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs()))
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_embeddings = format!("{}/api/embeddings", base);

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

    /// Retrieves one embedding via `/api/embeddings`.
    ///
    /// # Errors
    /// - [`EmbeddingServiceError::HttpStatus`] for non-2xx responses
    /// - [`EmbeddingServiceError::HttpTransport`] for client errors
    /// - [`EmbeddingServiceError::Decode`] if the response cannot be parsed
    #[instrument(skip_all, fields(model = %self.cfg.model, input_len = input.len()))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        debug!("POST {}", self.url_embeddings);
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
            return Err(EmbeddingServiceError::HttpStatus {
                status,
                url,
                snippet: make_snippet(&text),
            });
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            EmbeddingServiceError::Decode(format!(
                "serde error: {e}; expected `{{ embedding: number[] }}`"
            ))
        })?;

        Ok(out.embedding)
    }
}

/// Request body for `/api/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response body for `/api/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(endpoint: &str) -> EmbeddingModelConfig {
        EmbeddingModelConfig {
            provider: EmbeddingProvider::Ollama,
            model: "nomic-embed-text".into(),
            endpoint: endpoint.into(),
            api_key: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn rejects_foreign_provider_and_bad_endpoint() {
        let mut c = cfg("http://localhost:11434");
        c.provider = EmbeddingProvider::OpenAI;
        assert!(matches!(
            OllamaService::new(c),
            Err(EmbeddingServiceError::InvalidProvider { .. })
        ));
        assert!(matches!(
            OllamaService::new(cfg("localhost:11434")),
            Err(EmbeddingServiceError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn posts_prompt_and_decodes_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_json(serde_json::json!({
                "model": "nomic-embed-text",
                "prompt": "class A {}"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "embedding": [0.5, -1.0, 2.0] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let svc = OllamaService::new(cfg(&format!("{}/", server.uri()))).unwrap();
        let v = svc.embeddings("class A {}").await.unwrap();
        assert_eq!(v, vec![0.5, -1.0, 2.0]);
    }

    #[tokio::test]
    async fn non_success_status_keeps_snippet() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let svc = OllamaService::new(cfg(&server.uri())).unwrap();
        match svc.embeddings("x").await {
            Err(EmbeddingServiceError::HttpStatus {
                status, snippet, ..
            }) => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(snippet, "model not found");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "x": 1 })))
            .mount(&server)
            .await;

        let svc = OllamaService::new(cfg(&server.uri())).unwrap();
        assert!(matches!(
            svc.embeddings("x").await,
            Err(EmbeddingServiceError::Decode(_))
        ));
    }
}
