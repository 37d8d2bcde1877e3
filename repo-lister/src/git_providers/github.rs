//! GitHub provider (REST v3) for listing repository files.
//!
//! Endpoints used:
//!   * GET /repos/{owner}/{repo}/contents/{path}?ref={ref}
//!   * GET {download_url} (raw content, usually raw.githubusercontent.com)

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::errors::{ListerError, ListerResult};
use crate::git_providers::types::*;
use crate::git_providers::{CredentialScope, encode_path, ensure_success};

/// Raw-content host that serves `download_url`s of github.com repositories.
const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// GitHub HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String, // "https://api.github.com"
    token: String,
    scope: CredentialScope,
}

impl GitHubClient {
    /// Constructs a GitHub client with a shared HTTP instance and auth token.
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        debug!("Creating GitHubClient with base_api={}", base_api);
        let scope = CredentialScope::new(&base_api, &[GITHUB_RAW_BASE]);
        Self {
            http,
            base_api,
            token,
            scope,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header(AUTHORIZATION, format!("Bearer {}", self.token))
    }

    /// Walks the contents tree below the query's subdirectory.
    ///
    /// Directories are visited with an explicit stack, one request per
    /// directory. Returns every regular file that has a download URL; the
    /// facade applies the extension filter.
    ///
    /// GitHub owners are single accounts; a nested owner path is rejected.
    pub async fn list_candidates(&self, query: &ListingQuery) -> ListerResult<Vec<FileDescriptor>> {
        if query.owner().contains('/') {
            return Err(ListerError::Validation(format!(
                "GitHub owner '{}' must not contain '/'",
                query.owner()
            )));
        }

        let mut pending = vec![query.subdir().to_string()];
        let mut out = Vec::new();

        while let Some(dir) = pending.pop() {
            let url = self.contents_url(query.owner(), query.repo(), &dir);
            debug!("GitHub list contents: {}", url);

            let mut req = self
                .authorize(self.http.get(&url))
                .header(ACCEPT, "application/vnd.github+json");
            if let Some(r) = query.git_ref() {
                req = req.query(&[("ref", r)]);
            }

            let contents: GitHubContents = ensure_success(req.send().await?)?.json().await?;
            let items = match contents {
                GitHubContents::Dir(items) => items,
                GitHubContents::Single(item) => vec![item],
            };

            for item in items {
                match item.kind.as_str() {
                    "dir" => pending.push(item.path),
                    "file" => match item.download_url {
                        Some(download_url) => out.push(FileDescriptor {
                            download_url,
                            path: Some(item.path),
                            name: Some(item.name),
                            size: item.size,
                            sha: item.sha,
                        }),
                        None => trace!("skipping file without download_url: {}", item.path),
                    },
                    other => trace!("skipping {} entry: {}", other, item.path),
                }
            }
        }

        debug!("GitHub candidates collected: {}", out.len());
        Ok(out)
    }

    /// Fetches raw bytes from a download URL.
    ///
    /// The token is only sent to the API host and the raw-content host.
    pub async fn fetch_raw(&self, download_url: &str) -> ListerResult<Vec<u8>> {
        let mut req = self
            .http
            .get(download_url)
            .header(ACCEPT, "application/vnd.github.raw");
        if self.scope.allows(download_url) {
            req = self.authorize(req);
        } else {
            warn!("Fetching {} without credentials: foreign host", download_url);
        }
        let resp = req.send().await?;
        let bytes = ensure_success(resp)?.bytes().await?;
        Ok(bytes.to_vec())
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> String {
        let owner = urlencoding::encode(owner);
        let repo = urlencoding::encode(repo);
        if path.is_empty() {
            format!("{}/repos/{}/{}/contents", self.base_api, owner, repo)
        } else {
            format!(
                "{}/repos/{}/{}/contents/{}",
                self.base_api,
                owner,
                repo,
                encode_path(path)
            )
        }
    }
}

/// The contents endpoint returns an array for directories and an object
/// when the path names a single file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GitHubContents {
    Dir(Vec<GitHubContentItem>),
    Single(GitHubContentItem),
}

/// Contents API entry (subset).
#[derive(Debug, Deserialize)]
struct GitHubContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    sha: Option<String>,
}
