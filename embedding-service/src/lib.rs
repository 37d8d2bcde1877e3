//! Embedding endpoint clients used to turn source text into vectors.
//!
//! The crate keeps the model behind plain HTTP: a local Ollama server or any
//! OpenAI-compatible `/v1/embeddings` endpoint. [`EmbeddingService`] picks the
//! concrete client from an [`EmbeddingModelConfig`].

pub mod config;
pub mod embedding_service;
pub mod error_handler;
pub mod services;

pub use config::default_config::{config_embedding_from_env, config_embedding_from_lookup};
pub use config::embedding_model_config::EmbeddingModelConfig;
pub use config::embedding_provider::EmbeddingProvider;
pub use embedding_service::EmbeddingService;
pub use error_handler::{ConfigError, EmbeddingServiceError, Result};
