//! Embedding providers (pluggable). Implementations must be thread-safe.

mod llm;

pub use llm::LlmEmbedder;

use std::future::Future;
use std::pin::Pin;

use crate::errors::EmbedError;

/// Boxed future returned by the capability traits of this crate.
pub type EmbedFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, EmbedError>> + Send + 'a>>;

/// Maps a text to a fixed-length vector.
pub trait EmbeddingsProvider: Send + Sync {
    /// Encodes one input text.
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>>;
}

/// Rejects vectors that are empty, contain non-finite values or do not
/// match the expected size.
pub fn check_vector(v: &[f32], want: Option<usize>) -> Result<(), EmbedError> {
    if v.is_empty() {
        return Err(EmbedError::Model("encoder returned an empty vector".into()));
    }
    if let Some(want) = want {
        if v.len() != want {
            return Err(EmbedError::VectorSizeMismatch {
                got: v.len(),
                want,
            });
        }
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(EmbedError::Model(
            "encoder returned non-finite values".into(),
        ));
    }
    Ok(())
}
