//! Source of raw file content for the embedding stage.

use repo_lister::{FileDescriptor, ProviderClient};

use crate::embed::EmbedFuture;

/// Retrieves the bytes behind a descriptor's download URL.
pub trait ContentFetcher: Send + Sync {
    fn fetch<'a>(&'a self, file: &'a FileDescriptor) -> EmbedFuture<'a, Vec<u8>>;
}

impl ContentFetcher for ProviderClient {
    fn fetch<'a>(&'a self, file: &'a FileDescriptor) -> EmbedFuture<'a, Vec<u8>> {
        Box::pin(async move { Ok(self.fetch_raw(file.id()).await?) })
    }
}
