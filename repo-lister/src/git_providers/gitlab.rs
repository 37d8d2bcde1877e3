//! GitLab provider (REST v4) for listing repository files.
//!
//! Endpoints used:
//!   * GET /projects/{id}                                (default branch)
//!   * GET /projects/{id}/repository/tree?recursive=true (paginated)
//!   * GET /projects/{id}/repository/files/{path}/raw?ref={ref}

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{ListerResult, ProviderError};
use crate::git_providers::{CredentialScope, ensure_success};
use crate::git_providers::types::*;

const PER_PAGE: &str = "100";

/// GitLab HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String, // "https://gitlab.com/api/v4"
    token: String,
    scope: CredentialScope,
}

impl GitLabClient {
    /// Constructs a GitLab client with a shared HTTP instance and auth token.
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        debug!("Creating GitLabClient with base_api={}", base_api);
        let scope = CredentialScope::new(&base_api, &[]);
        Self {
            http,
            base_api,
            token,
            scope,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("PRIVATE-TOKEN", &self.token)
    }

    /// Collects every blob below the query's subdirectory.
    ///
    /// The tree endpoint is walked page by page following `x-next-page`.
    /// Download URLs point at the raw file endpoint pinned to the query ref,
    /// or to the project's default branch.
    pub async fn list_candidates(&self, query: &ListingQuery) -> ListerResult<Vec<FileDescriptor>> {
        let project_id = urlencoding::encode(&query.project()).into_owned();
        let git_ref = match query.git_ref() {
            Some(r) => r.to_string(),
            None => self.default_branch(&project_id).await?,
        };

        let url = format!("{}/projects/{}/repository/tree", self.base_api, project_id);
        let mut out = Vec::new();
        let mut page = String::from("1");

        loop {
            debug!("GitLab list tree: {} page={}", url, page);

            let resp = {
                let mut params = vec![
                    ("recursive", "true"),
                    ("per_page", PER_PAGE),
                    ("page", page.as_str()),
                    ("ref", git_ref.as_str()),
                ];
                if !query.subdir().is_empty() {
                    params.push(("path", query.subdir()));
                }
                let req = self.authorize(self.http.get(&url)).query(&params);
                ensure_success(req.send().await?)?
            };

            let next_page = resp
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());

            let entries: Vec<GitLabTreeEntry> = resp.json().await?;
            for e in entries.into_iter().filter(|e| e.kind == "blob") {
                out.push(FileDescriptor {
                    download_url: self.raw_url(&project_id, &e.path, &git_ref),
                    path: Some(e.path),
                    name: Some(e.name),
                    size: None,
                    sha: Some(e.id),
                });
            }

            match next_page {
                Some(p) => page = p,
                None => break,
            }
        }

        debug!("GitLab candidates collected: {}", out.len());
        Ok(out)
    }

    /// Fetches raw bytes from a download URL.
    ///
    /// `PRIVATE-TOKEN` is only sent to the instance the API base points at.
    pub async fn fetch_raw(&self, download_url: &str) -> ListerResult<Vec<u8>> {
        let mut req = self.http.get(download_url);
        if self.scope.allows(download_url) {
            req = self.authorize(req);
        } else {
            warn!("Fetching {} without credentials: foreign host", download_url);
        }
        let resp = req.send().await?;
        let bytes = ensure_success(resp)?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Resolves the project's default branch.
    ///
    /// An empty project has no default branch and is reported as not found.
    async fn default_branch(&self, project_id: &str) -> ListerResult<String> {
        let url = format!("{}/projects/{}", self.base_api, project_id);
        debug!("GitLab project meta: {}", url);

        let project: GitLabProject = ensure_success(self.authorize(self.http.get(&url)).send().await?)?
            .json()
            .await?;

        project
            .default_branch
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ProviderError::NotFound.into())
    }

    fn raw_url(&self, project_id: &str, path: &str, git_ref: &str) -> String {
        format!(
            "{}/projects/{}/repository/files/{}/raw?ref={}",
            self.base_api,
            project_id,
            urlencoding::encode(path),
            urlencoding::encode(git_ref)
        )
    }
}

#[derive(Debug, Deserialize)]
struct GitLabProject {
    #[serde(default)]
    default_branch: Option<String>,
}

/// Repository tree entry (subset).
#[derive(Debug, Deserialize)]
struct GitLabTreeEntry {
    id: String,
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[cfg(test)]
mod tests {
    use crate::git_providers::types::ListingQuery;
    use crate::git_providers::{ProviderClient, ProviderConfig, ProviderKind};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ProviderClient {
        let mut cfg = ProviderConfig::new(ProviderKind::GitLab, "glpat");
        cfg.base_api = format!("{}/api/v4", server.uri());
        ProviderClient::from_config(cfg).unwrap()
    }

    fn blob(path: &str) -> serde_json::Value {
        json!({
            "id": format!("id-{path}"),
            "name": path.rsplit('/').next().unwrap(),
            "path": path,
            "type": "blob",
            "mode": "100644"
        })
    }

    #[tokio::test]
    async fn follows_pagination_and_uses_default_branch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/acme%2Flib"))
            .and(header("private-token", "glpat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "default_branch": "develop" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/acme%2Flib/repository/tree"))
            .and(query_param("page", "1"))
            .and(query_param("ref", "develop"))
            .and(query_param("path", "src/main/java"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-next-page", "2")
                    .set_body_json(json!([
                        blob("src/main/java/A.java"),
                        { "id": "t", "name": "pkg", "path": "src/main/java/pkg", "type": "tree", "mode": "040000" }
                    ])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/acme%2Flib/repository/tree"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-next-page", "")
                    .set_body_json(json!([
                        blob("src/main/java/pkg/B.java"),
                        blob("src/main/java/pkg/notes.txt")
                    ])),
            )
            .mount(&server)
            .await;

        let q = ListingQuery::new("acme", "lib", "src/main/java", ["java"]).unwrap();
        let listing = client(&server).list_files(&q).await.unwrap();

        let paths: Vec<_> = listing.iter().map(|d| d.display_path()).collect();
        assert_eq!(paths, vec!["src/main/java/A.java", "src/main/java/pkg/B.java"]);
        assert_eq!(
            listing.entries()[1].download_url,
            format!(
                "{}/api/v4/projects/acme%2Flib/repository/files/src%2Fmain%2Fjava%2Fpkg%2FB.java/raw?ref=develop",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn explicit_ref_skips_project_lookup_and_fetch_uses_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/acme%2Flib/repository/tree"))
            .and(query_param("ref", "v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([blob("Main.java")])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/acme%2Flib/repository/files/Main.java/raw"))
            .and(query_param("ref", "v2"))
            .and(header("private-token", "glpat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("class Main {}"))
            .mount(&server)
            .await;

        let c = client(&server);
        let q = ListingQuery::new("acme", "lib", "", ["java"]).unwrap().with_ref("v2");
        let listing = c.list_files(&q).await.unwrap();
        assert_eq!(listing.len(), 1);

        let body = c.fetch_raw(listing.entries()[0].id()).await.unwrap();
        assert_eq!(body, b"class Main {}");
    }

    #[tokio::test]
    async fn private_token_stays_on_the_instance() {
        let server = MockServer::start().await;
        let other = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snippet.java"))
            .respond_with(ResponseTemplate::new(200).set_body_string("class S {}"))
            .mount(&other)
            .await;

        let body = client(&server)
            .fetch_raw(&format!("{}/snippet.java", other.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"class S {}");

        let received = other.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(!received[0].headers.contains_key("private-token"));
    }

    #[tokio::test]
    async fn empty_project_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/acme%2Fempty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "default_branch": null })))
            .mount(&server)
            .await;

        let q = ListingQuery::new("acme", "empty", "", ["java"]).unwrap();
        assert!(client(&server).list_files(&q).await.unwrap_err().is_not_found());
    }
}
