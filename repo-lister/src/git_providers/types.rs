//! Provider-agnostic data model for listing queries and file descriptors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ListerError, ListerResult};
use crate::filter::{ExtensionFilter, is_under, normalize_subdir};

/// Supported hosting providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProviderKind {
    GitHub,
    GitLab,
}

impl ProviderKind {
    /// Public API base used when none is configured.
    pub fn default_base_api(self) -> &'static str {
        match self {
            ProviderKind::GitHub => "https://api.github.com",
            ProviderKind::GitLab => "https://gitlab.com/api/v4",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(ProviderKind::GitHub),
            "gitlab" => Ok(ProviderKind::GitLab),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// One listing request: which files of which repository to collect.
///
/// * `owner`   – GitHub user/org, or GitLab namespace (may contain groups
///               on GitLab, e.g. `group/subgroup`).
/// * `repo`    – repository (project) name.
/// * `subdir`  – normalized subdirectory, empty for the repository root.
/// * `git_ref` – branch, tag or sha; provider default branch when `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    owner: String,
    repo: String,
    subdir: String,
    extensions: ExtensionFilter,
    git_ref: Option<String>,
}

impl ListingQuery {
    /// Validates and normalizes a query.
    ///
    /// # Errors
    /// Returns [`ListerError::Validation`] for an empty owner or repository,
    /// a repository containing `/`, or an invalid extension set.
    pub fn new<I, S>(
        owner: impl Into<String>,
        repo: impl Into<String>,
        subdir: &str,
        extensions: I,
    ) -> ListerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owner = normalize_subdir(&owner.into());
        let repo = repo.into().trim().to_string();

        if owner.is_empty() {
            return Err(ListerError::Validation("owner must not be empty".into()));
        }
        if repo.is_empty() || repo.contains('/') {
            return Err(ListerError::Validation(format!(
                "invalid repository name '{}'",
                repo
            )));
        }

        Ok(Self {
            owner,
            repo,
            subdir: normalize_subdir(subdir),
            extensions: ExtensionFilter::new(extensions)?,
            git_ref: None,
        })
    }

    /// Pins the listing to a branch, tag or commit.
    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        let r = git_ref.into();
        self.git_ref = if r.trim().is_empty() {
            None
        } else {
            Some(r.trim().to_string())
        };
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// `"owner/repo"`.
    pub fn project(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn subdir(&self) -> &str {
        &self.subdir
    }

    pub fn extensions(&self) -> &ExtensionFilter {
        &self.extensions
    }

    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }

    /// True if a repository-relative path satisfies both the subdirectory
    /// and the extension rule.
    pub fn accepts(&self, path: &str) -> bool {
        is_under(path, &self.subdir) && self.extensions.matches(path)
    }
}

/// A remote file discovered by a listing pass.
///
/// Only `download_url` is required on disk; it also serves as the
/// descriptor's identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileDescriptor {
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl FileDescriptor {
    /// Descriptor with only a download URL.
    pub fn from_url(download_url: impl Into<String>) -> Self {
        Self {
            download_url: download_url.into(),
            path: None,
            name: None,
            size: None,
            sha: None,
        }
    }

    /// Stable identifier, unique within a listing.
    pub fn id(&self) -> &str {
        &self.download_url
    }

    /// Repository path when known, the download URL otherwise.
    pub fn display_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.download_url)
    }
}

/// All descriptors produced by one listing query.
///
/// Serialized as a bare JSON array of descriptor objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FileListing {
    entries: Vec<FileDescriptor>,
}

impl FileListing {
    /// Builds a listing in canonical order: sorted by path then URL, with
    /// duplicate download URLs removed.
    pub fn new(mut entries: Vec<FileDescriptor>) -> Self {
        entries.sort_by(|a, b| {
            a.display_path()
                .cmp(b.display_path())
                .then_with(|| a.download_url.cmp(&b.download_url))
        });
        let mut seen = std::collections::HashSet::new();
        entries.retain(|d| seen.insert(d.download_url.clone()));
        Self { entries }
    }

    /// Keeps entries in the given order. Use [`FileListing::validate`] before
    /// trusting the result.
    pub fn from_entries(entries: Vec<FileDescriptor>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FileDescriptor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileDescriptor> {
        self.entries.iter()
    }

    /// Checks that every descriptor has a non-empty, unique download URL.
    ///
    /// # Errors
    /// Returns [`ListerError::Validation`] naming the offending entry.
    pub fn validate(&self) -> ListerResult<()> {
        let mut seen = std::collections::HashSet::new();
        for (i, d) in self.entries.iter().enumerate() {
            if d.download_url.trim().is_empty() {
                return Err(ListerError::Validation(format!(
                    "entry {} has an empty download_url",
                    i
                )));
            }
            if !seen.insert(d.download_url.as_str()) {
                return Err(ListerError::Validation(format!(
                    "duplicate download_url '{}'",
                    d.download_url
                )));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FileListing {
    type Item = &'a FileDescriptor;
    type IntoIter = std::slice::Iter<'a, FileDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for FileListing {
    type Item = FileDescriptor;
    type IntoIter = std::vec::IntoIter<FileDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
