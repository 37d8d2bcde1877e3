//! Stage B of the pipeline: turn a repository listing into embeddings.
//!
//! For every entry of a [`FileListing`](repo_lister::FileListing) the
//! content is fetched, normalized, encoded by an [`EmbeddingsProvider`] and
//! handed to an [`EmbeddingSink`] under one namespace. See
//! [`embed_listing`].

pub mod config;
pub mod embed;
pub mod errors;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod sink;

pub use config::{
    DistanceKind, EmbedConfig, FailurePolicy, QdrantSinkConfig, namespace_for_subdir,
};
pub use embed::{EmbeddingsProvider, LlmEmbedder};
pub use errors::EmbedError;
pub use fetch::ContentFetcher;
pub use pipeline::embed_listing;
pub use record::{EmbedReport, EmbeddedFile, SkippedFile};
pub use sink::{EmbeddingSink, JsonlSink, QdrantSink};
