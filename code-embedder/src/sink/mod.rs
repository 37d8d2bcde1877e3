//! Storage sinks for computed embeddings.
//!
//! A sink receives `(id, vector, namespace)` triples one by one and is
//! flushed once at the end of a successful run. Implementations may buffer.

mod jsonl;
mod qdrant;

pub use jsonl::JsonlSink;
pub use qdrant::QdrantSink;

use crate::embed::EmbedFuture;

/// Persists embeddings keyed by file id within a namespace.
pub trait EmbeddingSink: Send + Sync {
    /// Stores one embedding. Storing the same `(namespace, id)` twice
    /// replaces the earlier vector where the backend supports it.
    fn store<'a>(
        &'a self,
        id: &'a str,
        embedding: &'a [f32],
        namespace: &'a str,
    ) -> EmbedFuture<'a, ()>;

    /// Makes everything stored so far durable.
    fn flush(&self) -> EmbedFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}
