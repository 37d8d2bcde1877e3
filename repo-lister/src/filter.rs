//! Path and extension rules that every listing entry must satisfy.

use std::collections::BTreeSet;

use crate::errors::{ListerError, ListerResult};

/// Normalizes a repository subdirectory.
///
/// Surrounding slashes and empty segments are dropped, so `"/src//main/"`
/// becomes `"src/main"`. The empty string means the repository root.
pub fn normalize_subdir(subdir: &str) -> String {
    subdir
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns true if `path` equals `subdir` or lies below it.
///
/// `subdir` must already be normalized.
pub fn is_under(path: &str, subdir: &str) -> bool {
    if subdir.is_empty() {
        return true;
    }
    let path = path.trim_start_matches('/');
    path == subdir
        || path
            .strip_prefix(subdir)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Case-insensitive set of accepted file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    exts: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Builds a filter from raw extensions (`"java"`, `".Java"`, ...).
    ///
    /// # Errors
    /// Returns [`ListerError::Validation`] for an empty set or a blank entry.
    pub fn new<I, S>(extensions: I) -> ListerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exts = BTreeSet::new();
        for raw in extensions {
            let e = raw.as_ref().trim();
            let e = e.strip_prefix('.').unwrap_or(e);
            if e.is_empty() {
                return Err(ListerError::Validation(format!(
                    "invalid file extension '{}'",
                    raw.as_ref()
                )));
            }
            exts.insert(e.to_ascii_lowercase());
        }

        if exts.is_empty() {
            return Err(ListerError::Validation(
                "extension set must not be empty".into(),
            ));
        }

        Ok(Self { exts })
    }

    /// Normalized extensions, sorted.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.exts.iter().map(String::as_str)
    }

    /// Returns true if the final path segment ends with `.<ext>` for an accepted ext.
    pub fn matches(&self, path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
                self.exts.contains(&ext.to_ascii_lowercase())
            }
            _ => false,
        }
    }
}
