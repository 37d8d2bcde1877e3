//! Environment-driven settings for both stages.
//!
//! Values are read through a lookup closure so tests never touch the
//! process environment.

use std::path::PathBuf;

use anyhow::{Context, bail};
use code_embedder::{DistanceKind, QdrantSinkConfig, config::DEFAULT_MAX_CHARS};
use embedding_service::error_handler::{must_var, opt_u64, opt_usize, opt_var};
use embedding_service::{EmbeddingModelConfig, config_embedding_from_lookup};
use repo_lister::{ProviderConfig, ProviderKind};

pub const DEFAULT_EMBEDDINGS_OUT: &str = "embeddings.jsonl";
pub const DEFAULT_COLLECTION: &str = "code_embeddings";
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Where embeddings end up.
#[derive(Debug, Clone)]
pub enum SinkSettings {
    Jsonl { path: PathBuf },
    Qdrant(QdrantSinkConfig),
}

/// Everything the embed stage needs besides the listing.
#[derive(Debug, Clone)]
pub struct EmbedSettings {
    pub model: EmbeddingModelConfig,
    pub expected_dim: Option<usize>,
    pub max_chars: usize,
    pub sink: SinkSettings,
}

/// Repository provider settings (`REPO_*`, `HTTP_TIMEOUT_SECS`).
pub fn repo_from_lookup<F>(lookup: &F) -> anyhow::Result<ProviderConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let kind = match opt_var(lookup, "REPO_PROVIDER") {
        Some(raw) => raw.parse::<ProviderKind>()?,
        None => ProviderKind::GitHub,
    };
    let token = must_var(lookup, "REPO_TOKEN")?;

    let mut cfg = ProviderConfig::new(kind, token);
    if let Some(base) = opt_var(lookup, "REPO_API_BASE") {
        cfg.base_api = base.trim_end_matches('/').to_string();
    }
    cfg.timeout_secs = opt_u64(lookup, "HTTP_TIMEOUT_SECS")?;
    Ok(cfg)
}

/// Encoder and sink settings (`EMBEDDING_*`, `EMBED_SINK`, `QDRANT_*`, ...).
pub fn embed_from_lookup<F>(lookup: &F) -> anyhow::Result<EmbedSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let model = config_embedding_from_lookup(lookup).context("embedding model config")?;
    let expected_dim = opt_usize(lookup, "EMBEDDING_DIM")?;
    let max_chars = opt_usize(lookup, "CHUNK_MAX_CHARS")?.unwrap_or(DEFAULT_MAX_CHARS);
    if max_chars == 0 {
        bail!("CHUNK_MAX_CHARS must be > 0");
    }

    let sink = match opt_var(lookup, "EMBED_SINK").as_deref().map(str::to_ascii_lowercase) {
        None => jsonl_sink(lookup),
        Some(kind) if kind == "jsonl" => jsonl_sink(lookup),
        Some(kind) if kind == "qdrant" => SinkSettings::Qdrant(qdrant_sink(lookup)?),
        Some(other) => bail!("unsupported EMBED_SINK '{other}', expected 'jsonl' or 'qdrant'"),
    };

    Ok(EmbedSettings {
        model,
        expected_dim,
        max_chars,
        sink,
    })
}

fn jsonl_sink<F>(lookup: &F) -> SinkSettings
where
    F: Fn(&str) -> Option<String>,
{
    let path = opt_var(lookup, "EMBEDDINGS_OUT").unwrap_or_else(|| DEFAULT_EMBEDDINGS_OUT.into());
    SinkSettings::Jsonl { path: path.into() }
}

fn qdrant_sink<F>(lookup: &F) -> anyhow::Result<QdrantSinkConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let url = opt_var(lookup, "QDRANT_URL").unwrap_or_else(|| DEFAULT_QDRANT_URL.into());
    let collection =
        opt_var(lookup, "QDRANT_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.into());

    let mut cfg = QdrantSinkConfig::new_default(url, collection);
    cfg.api_key = opt_var(lookup, "QDRANT_API_KEY");
    if let Some(batch) = opt_usize(lookup, "QDRANT_UPSERT_BATCH")? {
        cfg.upsert_batch = batch;
    }
    if let Some(d) = opt_var(lookup, "QDRANT_DISTANCE") {
        cfg.distance = d.parse::<DistanceKind>()?;
    }
    cfg.validate()?;
    Ok(cfg)
}
