//! Runtime configuration for the embedding stage and its sinks.

use std::str::FromStr;

use repo_lister::filter::normalize_subdir;

use crate::errors::EmbedError;

/// Namespace used when the listing covers the repository root.
pub const ROOT_NAMESPACE: &str = "root";

/// Default cap on characters sent to the encoder per file.
pub const DEFAULT_MAX_CHARS: usize = 4000;

/// What to do when one file cannot be fetched or embedded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run and return the first error.
    #[default]
    Abort,
    /// Log the failure, record it in the report and continue.
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(EmbedError::Config(format!(
                "unknown failure policy '{other}', expected 'abort' or 'skip'"
            ))),
        }
    }
}

/// Derives the storage namespace from a repository subdirectory.
///
/// `"/src/main/java/"` → `"src/main/java"`, `""` → `"root"`.
pub fn namespace_for_subdir(subdir: &str) -> String {
    let ns = normalize_subdir(subdir);
    if ns.is_empty() {
        ROOT_NAMESPACE.to_string()
    } else {
        ns
    }
}

/// Configuration for one embedding run.
#[derive(Clone, Debug)]
pub struct EmbedConfig {
    /// Label every stored embedding is scoped to.
    pub namespace: String,
    /// Enforced vector size; the first vector's size is used when `None`.
    pub expected_dim: Option<usize>,
    /// Maximum characters of normalized text sent to the encoder.
    pub max_chars: usize,
    /// Per-file failure handling.
    pub on_error: FailurePolicy,
    /// Draw a progress bar on stderr.
    pub show_progress: bool,
}

impl EmbedConfig {
    /// Defaults for a listing taken from `subdir`.
    pub fn for_subdir(subdir: &str) -> Self {
        Self {
            namespace: namespace_for_subdir(subdir),
            expected_dim: None,
            max_chars: DEFAULT_MAX_CHARS,
            on_error: FailurePolicy::Abort,
            show_progress: true,
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.namespace.trim().is_empty() {
            return Err(EmbedError::Config("namespace is empty".into()));
        }
        if self.max_chars == 0 {
            return Err(EmbedError::Config("max_chars must be > 0".into()));
        }
        if self.expected_dim == Some(0) {
            return Err(EmbedError::Config("expected_dim must be > 0".into()));
        }
        Ok(())
    }
}

/// Distance function used for the Qdrant collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    #[default]
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

impl FromStr for DistanceKind {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "dot" => Ok(Self::Dot),
            "euclid" | "l2" => Ok(Self::Euclid),
            other => Err(EmbedError::Config(format!("unknown distance '{other}'"))),
        }
    }
}

/// Connection and collection settings for the Qdrant sink.
#[derive(Clone, Debug)]
pub struct QdrantSinkConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    pub api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    pub distance: DistanceKind,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
}

impl QdrantSinkConfig {
    /// Creates a sane default config for a given endpoint and collection.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            upsert_batch: 256,
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.url.trim().is_empty() {
            return Err(EmbedError::Config("qdrant url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(EmbedError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(EmbedError::Config("upsert_batch must be > 0".into()));
        }
        Ok(())
    }
}
