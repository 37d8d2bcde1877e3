//! Stage A of the pipeline: discover source files in a hosted repository.
//!
//! A [`ListingQuery`] names a repository, a subdirectory and a set of file
//! extensions. [`ProviderClient::list_files`] turns it into a
//! [`FileListing`]; [`refresh_manifest`] persists that listing so the
//! embedding stage can pick it up later.

mod errors;
pub mod filter;
pub mod git_providers;
pub mod manifest;

pub use errors::{ConfigError, ListerError, ListerResult, ManifestError, ProviderError};
pub use git_providers::{
    FileDescriptor, FileListing, ListingQuery, ProviderClient, ProviderConfig, ProviderKind,
};
pub use manifest::{DEFAULT_MANIFEST_FILE, load_manifest, save_manifest};

use std::path::Path;

use tracing::info;

/// Lists matching files and replaces the manifest at `manifest_path`.
///
/// The manifest is written only after the listing succeeded in full, so an
/// auth, not-found, rate-limit or transport failure leaves the previous
/// manifest untouched.
pub async fn refresh_manifest(
    client: &ProviderClient,
    query: &ListingQuery,
    manifest_path: impl AsRef<Path>,
) -> ListerResult<FileListing> {
    info!(
        provider = ?client.kind(),
        project = %query.project(),
        subdir = %query.subdir(),
        "refresh_manifest started"
    );

    let listing = client.list_files(query).await?;
    save_manifest(manifest_path, &listing)?;

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn github(server: &MockServer, token: &str) -> ProviderClient {
        let mut cfg = ProviderConfig::new(ProviderKind::GitHub, token);
        cfg.base_api = server.uri();
        ProviderClient::from_config(cfg).unwrap()
    }

    async fn mount_repo(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/repos/acme/lib/contents/src/main/java"))
            .and(header("authorization", "Bearer valid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "name": "Main.java",
                    "path": "src/main/java/Main.java",
                    "type": "file",
                    "download_url": format!("{}/raw/Main.java", server.uri())
                },
                {
                    "name": "Util.java",
                    "path": "src/main/java/Util.java",
                    "type": "file",
                    "download_url": format!("{}/raw/Util.java", server.uri())
                }
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/lib/contents/src/main/java"))
            .and(header("authorization", "Bearer revoked"))
            .respond_with(ResponseTemplate::new(401))
            .mount(server)
            .await;
    }

    fn query() -> ListingQuery {
        ListingQuery::new("acme", "lib", "src/main/java", ["java"]).unwrap()
    }

    #[tokio::test]
    async fn refresh_is_idempotent_for_unchanged_remote() {
        let server = MockServer::start().await;
        mount_repo(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join(DEFAULT_MANIFEST_FILE);
        let client = github(&server, "valid");

        let first = refresh_manifest(&client, &query(), &manifest).await.unwrap();
        let first_bytes = std::fs::read(&manifest).unwrap();
        let second = refresh_manifest(&client, &query(), &manifest).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(std::fs::read(&manifest).unwrap(), first_bytes);
        assert_eq!(load_manifest(&manifest).unwrap(), first);
    }

    #[tokio::test]
    async fn auth_failure_does_not_overwrite_existing_manifest() {
        let server = MockServer::start().await;
        mount_repo(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join(DEFAULT_MANIFEST_FILE);

        refresh_manifest(&github(&server, "valid"), &query(), &manifest)
            .await
            .unwrap();
        let before = std::fs::read(&manifest).unwrap();

        let err = refresh_manifest(&github(&server, "revoked"), &query(), &manifest)
            .await
            .unwrap_err();

        assert!(err.is_auth());
        assert_eq!(std::fs::read(&manifest).unwrap(), before);
    }

    #[tokio::test]
    async fn auth_failure_without_previous_manifest_creates_nothing() {
        let server = MockServer::start().await;
        mount_repo(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join(DEFAULT_MANIFEST_FILE);

        let err = refresh_manifest(&github(&server, "revoked"), &query(), &manifest)
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert!(!manifest.exists());
    }
}
