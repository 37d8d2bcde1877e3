//! Provider facade without async-trait or dynamic trait objects.
//!
//! [`ProviderClient`] wraps the concrete implementation for each hosting
//! service and exposes a uniform interface for:
//!   * listing the files below a subdirectory that match an extension set
//!   * downloading raw file content from a descriptor's download URL.

pub mod types;
pub use types::*;

pub mod github;
pub mod gitlab;

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use tracing::{debug, info, instrument};

use crate::errors::{ConfigError, ListerResult, ProviderError};

/// Default HTTP timeout applied to every provider request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runtime configuration for any provider client.
///
/// Usually injected from environment or CLI settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// API base, e.g. "https://api.github.com" or "https://gitlab.com/api/v4".
    pub base_api: String,
    /// Access token for the provider (PAT or app token), without scheme prefix.
    pub token: String,
    /// Per-request timeout; [`DEFAULT_TIMEOUT_SECS`] when `None`.
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Config pointing at the provider's public API.
    pub fn new(kind: ProviderKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            base_api: kind.default_base_api().to_string(),
            token: token.into(),
            timeout_secs: None,
        }
    }
}

/// Concrete provider client with enum dispatch.
#[derive(Debug, Clone)]
pub enum ProviderClient {
    GitHub(github::GitHubClient),
    GitLab(gitlab::GitLabClient),
}

impl ProviderClient {
    /// Constructs a concrete provider client from generic configuration.
    ///
    /// # Errors
    /// - [`ConfigError::MissingToken`] for an empty token
    /// - [`ConfigError::InvalidBaseUrl`] for a base URL without http/https scheme
    pub fn from_config(cfg: ProviderConfig) -> ListerResult<Self> {
        debug!(
            "Initializing provider client: kind={:?}, base_api={}",
            cfg.kind, cfg.base_api
        );

        let token = cfg.token.trim().to_string();
        if token.is_empty() {
            return Err(ConfigError::MissingToken.into());
        }

        let base_api = cfg.base_api.trim().trim_end_matches('/').to_string();
        if !(base_api.starts_with("http://") || base_api.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(cfg.base_api).into());
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("repo-embedder/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(
                cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()?;

        let client = match cfg.kind {
            ProviderKind::GitHub => {
                ProviderClient::GitHub(github::GitHubClient::new(http, base_api, token))
            }
            ProviderKind::GitLab => {
                ProviderClient::GitLab(gitlab::GitLabClient::new(http, base_api, token))
            }
        };

        Ok(client)
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::GitHub(_) => ProviderKind::GitHub,
            Self::GitLab(_) => ProviderKind::GitLab,
        }
    }

    /// Lists every file under the query's subdirectory that matches its
    /// extension set.
    ///
    /// The provider walk is narrowed by path; the final rule is enforced here
    /// so the listing invariant holds for every provider.
    #[instrument(skip_all, fields(provider = ?self.kind(), project = %query.project()))]
    pub async fn list_files(&self, query: &ListingQuery) -> ListerResult<FileListing> {
        debug!(
            "Listing files: project={}, subdir='{}', ref={:?}",
            query.project(),
            query.subdir(),
            query.git_ref()
        );

        let candidates = match self {
            Self::GitHub(c) => c.list_candidates(query).await?,
            Self::GitLab(c) => c.list_candidates(query).await?,
        };
        let total = candidates.len();

        let accepted: Vec<FileDescriptor> = candidates
            .into_iter()
            .filter(|d| d.path.as_deref().is_some_and(|p| query.accepts(p)))
            .collect();

        let listing = FileListing::new(accepted);
        info!(
            project = %query.project(),
            subdir = %query.subdir(),
            scanned = total,
            matched = listing.len(),
            "listing completed"
        );
        Ok(listing)
    }

    /// Downloads raw file bytes from a descriptor's download URL.
    ///
    /// The provider's credential is attached only for URLs on the provider's
    /// own hosts, so private repositories work and foreign hosts never see it.
    #[instrument(skip_all, fields(url = %download_url))]
    pub async fn fetch_raw(&self, download_url: &str) -> ListerResult<Vec<u8>> {
        debug!("Fetching raw content: {}", download_url);

        match self {
            Self::GitHub(c) => c.fetch_raw(download_url).await,
            Self::GitLab(c) => c.fetch_raw(download_url).await,
        }
    }
}

/// Maps a non-2xx response into a [`ProviderError`], keeping rate-limit hints.
///
/// A 403 counts as rate limiting when the quota header reports zero
/// remaining calls or a `Retry-After` is present (GitHub secondary limits).
pub(crate) fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let headers = resp.headers();
    let retry_after_secs = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let quota_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    let code = status.as_u16();
    debug!(status = code, retry_after_secs, quota_exhausted, "provider returned error status");

    Err(match code {
        401 => ProviderError::Unauthorized,
        403 if quota_exhausted || retry_after_secs.is_some() => {
            ProviderError::RateLimited { retry_after_secs }
        }
        403 => ProviderError::Forbidden,
        404 => ProviderError::NotFound,
        429 => ProviderError::RateLimited { retry_after_secs },
        500..=599 => ProviderError::Server(code),
        _ => ProviderError::HttpStatus(code),
    })
}

/// Origins (host and port) a client may send its credential to.
///
/// Download URLs come from manifests that may have been edited or produced
/// elsewhere; anything outside the scope is fetched anonymously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CredentialScope {
    origins: Vec<(String, u16)>,
}

impl CredentialScope {
    /// Scope covering the API base plus any extra raw-content bases.
    pub(crate) fn new(base_api: &str, extra: &[&str]) -> Self {
        let origins = std::iter::once(base_api)
            .chain(extra.iter().copied())
            .filter_map(origin_of)
            .collect();
        Self { origins }
    }

    pub(crate) fn allows(&self, url: &str) -> bool {
        origin_of(url).is_some_and(|o| self.origins.contains(&o))
    }
}

fn origin_of(url: &str) -> Option<(String, u16)> {
    let u = reqwest::Url::parse(url).ok()?;
    let host = u.host_str()?.to_ascii_lowercase();
    Some((host, u.port_or_known_default()?))
}

/// Percent-encodes each segment of a repository path, keeping the slashes.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_validates_token_and_base() {
        let err = ProviderClient::from_config(ProviderConfig::new(ProviderKind::GitHub, "  "))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::ListerError::Config(ConfigError::MissingToken)
        ));

        let mut cfg = ProviderConfig::new(ProviderKind::GitLab, "t");
        cfg.base_api = "gitlab.local/api/v4".into();
        assert!(matches!(
            ProviderClient::from_config(cfg),
            Err(crate::ListerError::Config(ConfigError::InvalidBaseUrl(_)))
        ));

        let ok = ProviderClient::from_config(ProviderConfig::new(ProviderKind::GitLab, "t")).unwrap();
        assert_eq!(ok.kind(), ProviderKind::GitLab);
    }

    #[test]
    fn credential_scope_matches_host_and_port() {
        let scope = CredentialScope::new(
            "https://api.github.com",
            &["https://raw.githubusercontent.com"],
        );
        assert!(scope.allows("https://raw.githubusercontent.com/acme/lib/main/A.java"));
        assert!(scope.allows("https://API.github.com/repos/acme/lib"));
        assert!(!scope.allows("https://raw.githubusercontent.com:8443/acme/A.java"));
        assert!(!scope.allows("http://raw.githubusercontent.com/acme/A.java"));
        assert!(!scope.allows("https://evil.example.com/A.java"));
        assert!(!scope.allows("not a url"));

        let local = CredentialScope::new("http://127.0.0.1:8080/api/v4", &[]);
        assert!(local.allows("http://127.0.0.1:8080/api/v4/projects/1/repository/files/a/raw"));
        assert!(!local.allows("http://127.0.0.1:9090/a.java"));
    }

    #[test]
    fn encode_path_keeps_separators() {
        assert_eq!(encode_path("src/My Dir/a#b.java"), "src/My%20Dir/a%23b.java");
    }
}
