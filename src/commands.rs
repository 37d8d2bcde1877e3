//! Stage wiring for the CLI subcommands.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use code_embedder::{
    EmbedConfig, EmbedReport, EmbeddingSink, JsonlSink, LlmEmbedder, QdrantSink, embed_listing,
};
use embedding_service::EmbeddingService;
use repo_lister::{
    FileListing, ListerError, ListingQuery, ProviderClient, ProviderError, load_manifest,
    refresh_manifest,
};
use tracing::info;

use crate::cli::{EmbedOpts, ListArgs};
use crate::config::{SinkSettings, embed_from_lookup, repo_from_lookup};

/// Operator hint for a provider failure anywhere in the error chain.
pub fn failure_hint(err: &anyhow::Error) -> Option<String> {
    let lister = err.chain().find_map(|e| e.downcast_ref::<ListerError>())?;

    if lister.is_rate_limited() {
        let wait = match lister {
            ListerError::Provider(ProviderError::RateLimited {
                retry_after_secs: Some(secs),
            }) => format!("retry in {secs}s"),
            _ => "retry later".to_string(),
        };
        Some(format!("provider rate limit reached; {wait}"))
    } else if lister.is_auth() {
        Some("provider rejected the credential; check REPO_TOKEN and its scopes".into())
    } else if lister.is_not_found() {
        Some("repository or path not found; check --owner, --repo, --subdir and --ref".into())
    } else {
        None
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn provider_client() -> anyhow::Result<ProviderClient> {
    let cfg = repo_from_lookup(&env_lookup).context("repository provider config")?;
    Ok(ProviderClient::from_config(cfg)?)
}

/// Stage A: list matching files and replace the manifest.
pub async fn list(manifest: &Path, args: &ListArgs) -> anyhow::Result<FileListing> {
    let client = provider_client()?;

    let mut query = ListingQuery::new(&args.owner, &args.repo, &args.subdir, &args.exts)?;
    if let Some(r) = &args.git_ref {
        query = query.with_ref(r);
    }

    let listing = refresh_manifest(&client, &query, manifest)
        .await
        .with_context(|| format!("listing {}/{}", args.owner, args.repo))?;

    println!(
        "listed {} file(s) under '{}' into {}",
        listing.len(),
        query.subdir(),
        manifest.display()
    );
    Ok(listing)
}

/// Stage B: embed every entry of the manifest at `manifest`.
pub async fn embed(manifest: &Path, subdir: &str, opts: &EmbedOpts) -> anyhow::Result<EmbedReport> {
    let listing = load_manifest(manifest)
        .with_context(|| format!("loading manifest {}", manifest.display()))?;
    embed_loaded(&listing, subdir, opts).await
}

/// Stage A then stage B over the listing just produced.
pub async fn run(manifest: &Path, args: &ListArgs, opts: &EmbedOpts) -> anyhow::Result<EmbedReport> {
    let listing = list(manifest, args).await?;
    embed_loaded(&listing, &args.subdir, opts).await
}

async fn embed_loaded(
    listing: &FileListing,
    subdir: &str,
    opts: &EmbedOpts,
) -> anyhow::Result<EmbedReport> {
    let fetcher = provider_client()?;
    let settings = embed_from_lookup(&env_lookup)?;

    let mut cfg = EmbedConfig::for_subdir(subdir);
    if let Some(ns) = &opts.namespace {
        cfg.namespace = ns.trim().to_string();
    }
    cfg.expected_dim = settings.expected_dim;
    cfg.max_chars = settings.max_chars;
    cfg.on_error = opts.on_error;
    cfg.show_progress = !opts.no_progress;

    let service = EmbeddingService::from_config(settings.model).context("embedding service")?;
    let embedder = LlmEmbedder::new(Arc::new(service), settings.expected_dim);
    info!(model = %embedder.model(), namespace = %cfg.namespace, "encoder ready");

    let sink: Box<dyn EmbeddingSink> = match &settings.sink {
        SinkSettings::Jsonl { path } => Box::new(
            JsonlSink::create(path)
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        SinkSettings::Qdrant(q) => Box::new(QdrantSink::new(q).context("qdrant sink")?),
    };

    let report = embed_listing(listing, &cfg, &fetcher, &embedder, sink.as_ref())
        .await
        .context("embedding run")?;

    println!(
        "embedded {}/{} file(s) into namespace '{}' (skipped {})",
        report.embedded,
        report.listed,
        cfg.namespace,
        report.skipped.len()
    );
    for s in &report.skipped {
        println!("  skipped {}: {}", s.id, s.reason);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_embedder::EmbedError;

    #[test]
    fn hints_rate_limit_with_retry_after_through_context() {
        let err = anyhow::Error::from(ListerError::from(ProviderError::RateLimited {
            retry_after_secs: Some(30),
        }))
        .context("listing acme/lib");

        assert_eq!(
            failure_hint(&err).as_deref(),
            Some("provider rate limit reached; retry in 30s")
        );
    }

    #[test]
    fn hints_provider_errors_wrapped_by_embed_stage() {
        let fetch = EmbedError::from(ListerError::from(ProviderError::RateLimited {
            retry_after_secs: None,
        }));
        let err = anyhow::Error::from(fetch).context("embedding run");
        assert_eq!(
            failure_hint(&err).as_deref(),
            Some("provider rate limit reached; retry later")
        );

        let auth = anyhow::Error::from(ListerError::from(ProviderError::Unauthorized));
        assert!(failure_hint(&auth).unwrap().contains("REPO_TOKEN"));
    }

    #[test]
    fn no_hint_for_other_failures() {
        let err = anyhow::Error::from(EmbedError::Model("empty vector".into()));
        assert!(failure_hint(&err).is_none());
        assert!(failure_hint(&anyhow::anyhow!("boom")).is_none());
    }
}
