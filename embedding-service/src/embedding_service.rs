//! Provider facade over the concrete embedding clients.
//!
//! Enum dispatch, no dynamic trait objects: construct once from an
//! [`EmbeddingModelConfig`], wrap in `Arc`, and share.

use tracing::debug;

use crate::config::{
    embedding_model_config::EmbeddingModelConfig, embedding_provider::EmbeddingProvider,
};
use crate::error_handler::Result;
use crate::services::{ollama_service::OllamaService, open_ai_service::OpenAiService};

/// Concrete embedding client selected by [`EmbeddingProvider`].
#[derive(Debug)]
pub enum EmbeddingService {
    Ollama(OllamaService),
    OpenAI(OpenAiService),
}

impl EmbeddingService {
    /// Builds the client matching `cfg.provider`.
    ///
    /// # Errors
    /// Propagates constructor validation errors of the concrete client.
    pub fn from_config(cfg: EmbeddingModelConfig) -> Result<Self> {
        debug!(
            "Initializing embedding service: provider={:?}, model={}, endpoint={}",
            cfg.provider, cfg.model, cfg.endpoint
        );

        let svc = match cfg.provider {
            EmbeddingProvider::Ollama => Self::Ollama(OllamaService::new(cfg)?),
            EmbeddingProvider::OpenAI => Self::OpenAI(OpenAiService::new(cfg)?),
        };
        Ok(svc)
    }

    /// Model identifier used for every request.
    pub fn model(&self) -> &str {
        match self {
            Self::Ollama(s) => s.model(),
            Self::OpenAI(s) => s.model(),
        }
    }

    /// Computes one embedding for `input`.
    ///
    /// # Errors
    /// Returns transport, status or decode errors of the underlying client.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        match self {
            Self::Ollama(s) => s.embeddings(input).await,
            Self::OpenAI(s) => s.embeddings(input).await,
        }
    }
}
