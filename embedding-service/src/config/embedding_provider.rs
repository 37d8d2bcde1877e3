use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Backend serving the pretrained embedding model.
///
/// Adding another backend means extending this enum and
/// [`crate::EmbeddingService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingProvider {
    /// Local Ollama runtime (`/api/embeddings`).
    Ollama,
    /// OpenAI or any OpenAI-compatible server (`/v1/embeddings`).
    OpenAI,
}

impl FromStr for EmbeddingProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "open_ai" | "open-ai" => Ok(Self::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_providers() {
        assert_eq!("Ollama".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::Ollama);
        assert_eq!(" openai ".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::OpenAI);
        assert_eq!(
            "bert".parse::<EmbeddingProvider>().unwrap_err(),
            ConfigError::UnsupportedProvider("bert".into())
        );
    }
}
