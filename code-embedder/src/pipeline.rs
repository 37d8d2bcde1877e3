//! Stage B driver: listing in, embeddings out.
//!
//! Files are processed strictly one after another in listing order:
//! fetch, decode, normalize, encode, store. The sink is flushed once after
//! the last file.

use indicatif::{ProgressBar, ProgressStyle};
use repo_lister::{FileDescriptor, FileListing};
use tracing::{error, info, warn};

use crate::config::{EmbedConfig, FailurePolicy};
use crate::embed::{EmbeddingsProvider, check_vector};
use crate::errors::EmbedError;
use crate::fetch::ContentFetcher;
use crate::normalize::normalize_code_light;
use crate::record::{EmbedReport, SkippedFile};
use crate::sink::EmbeddingSink;

/// Embeds every entry of `listing` and stores the vectors in `sink`.
///
/// Fetch and model failures follow `cfg.on_error`; sink failures always
/// end the run. An empty listing performs no fetch, encode or store calls.
pub async fn embed_listing(
    listing: &FileListing,
    cfg: &EmbedConfig,
    fetcher: &dyn ContentFetcher,
    provider: &dyn EmbeddingsProvider,
    sink: &dyn EmbeddingSink,
) -> Result<EmbedReport, EmbedError> {
    cfg.validate()?;
    info!(
        files = listing.len(),
        namespace = %cfg.namespace,
        policy = ?cfg.on_error,
        "embedding run started"
    );

    let pb = progress_bar(listing.len(), cfg.show_progress);
    let mut report = EmbedReport::new(listing.len());
    let mut dim = cfg.expected_dim;

    for file in listing {
        pb.set_message(file.display_path().to_string());

        match embed_one(file, cfg, fetcher, provider, dim).await {
            Ok(vector) => {
                if let Err(e) = sink.store(file.id(), &vector, &cfg.namespace).await {
                    pb.abandon();
                    error!(id = %file.id(), error = %e, "sink rejected embedding");
                    return Err(e);
                }
                dim = dim.or(Some(vector.len()));
                report.embedded += 1;
            }
            Err(e) => match cfg.on_error {
                FailurePolicy::Abort => {
                    pb.abandon();
                    error!(id = %file.id(), error = %e, "embedding run aborted");
                    return Err(e);
                }
                FailurePolicy::Skip => {
                    warn!(id = %file.id(), error = %e, "skipping file");
                    report.skipped.push(SkippedFile {
                        id: file.id().to_string(),
                        reason: e.to_string(),
                    });
                }
            },
        }
        pb.inc(1);
    }

    sink.flush().await?;
    pb.finish_and_clear();

    report.dimension = dim.filter(|_| report.embedded > 0);
    info!(
        embedded = report.embedded,
        skipped = report.skipped.len(),
        dimension = ?report.dimension,
        "embedding run finished"
    );
    Ok(report)
}

async fn embed_one(
    file: &FileDescriptor,
    cfg: &EmbedConfig,
    fetcher: &dyn ContentFetcher,
    provider: &dyn EmbeddingsProvider,
    dim: Option<usize>,
) -> Result<Vec<f32>, EmbedError> {
    let bytes = fetcher.fetch(file).await?;
    let text = String::from_utf8(bytes).map_err(|e| {
        EmbedError::Model(format!("{} is not valid UTF-8: {e}", file.display_path()))
    })?;

    let text = normalize_code_light(&text, cfg.max_chars);
    if text.trim().is_empty() {
        return Err(EmbedError::Model(format!(
            "{} has no text to embed",
            file.display_path()
        )));
    }

    let vector = provider.embed(&text).await?;
    check_vector(&vector, dim)?;
    Ok(vector)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}") {
        pb.set_style(style);
    }
    pb
}
