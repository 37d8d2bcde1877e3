//! Adapter from the HTTP embedding service to [`EmbeddingsProvider`].

use std::sync::Arc;

use embedding_service::EmbeddingService;
use tracing::debug;

use crate::embed::{EmbedFuture, EmbeddingsProvider, check_vector};

/// Encoder backed by a remote model (Ollama or OpenAI-compatible).
#[derive(Clone)]
pub struct LlmEmbedder {
    svc: Arc<EmbeddingService>,
    dim: Option<usize>,
}

impl LlmEmbedder {
    /// Wraps a service. `dim` pins the vector size the model must return.
    pub fn new(svc: Arc<EmbeddingService>, dim: Option<usize>) -> Self {
        Self { svc, dim }
    }

    pub fn model(&self) -> &str {
        self.svc.model()
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>> {
        Box::pin(async move {
            debug!(model = %self.svc.model(), chars = text.len(), "embedding text");
            let v = self.svc.embed(text).await?;
            check_vector(&v, self.dim)?;
            Ok(v)
        })
    }
}
