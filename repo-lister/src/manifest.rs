//! Persisted listing (the manifest) shared between the two pipeline stages.
//!
//! The file is a pretty-printed JSON array of descriptor objects. Writes go
//! through a sibling temp file and a rename, so a reader never sees a
//! half-written manifest and a failed write leaves the previous one intact.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{ListerError, ListerResult};
use crate::git_providers::types::FileListing;

/// Conventional manifest file name.
pub const DEFAULT_MANIFEST_FILE: &str = "download_urls.json";

/// Writes `listing` to `path`, replacing any previous manifest atomically.
///
/// # Errors
/// - [`ListerError::Validation`] if `path` has no file name
/// - [`ListerError::Manifest`] on I/O or serialization failure
pub fn save_manifest(path: impl AsRef<Path>, listing: &FileListing) -> ListerResult<()> {
    let path = path.as_ref();
    let tmp = temp_path_for(path)?;

    let mut json = serde_json::to_vec_pretty(listing)?;
    json.push(b'\n');

    let written = (|| -> std::io::Result<()> {
        let mut f = File::create(&tmp)?;
        f.write_all(&json)?;
        f.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    info!(path = %path.display(), entries = listing.len(), "manifest saved");
    Ok(())
}

/// Reads a manifest written by [`save_manifest`] (or any JSON array of
/// objects carrying at least `download_url`).
///
/// Entry order is preserved.
///
/// # Errors
/// - [`ListerError::Manifest`] if the file is missing or not valid JSON
/// - [`ListerError::Validation`] for empty or duplicate download URLs
pub fn load_manifest(path: impl AsRef<Path>) -> ListerResult<FileListing> {
    let path = path.as_ref();
    debug!("Loading manifest {}", path.display());

    let bytes = fs::read(path)?;
    let listing: FileListing = serde_json::from_slice(&bytes)?;
    listing.validate()?;

    info!(path = %path.display(), entries = listing.len(), "manifest loaded");
    Ok(listing)
}

fn temp_path_for(path: &Path) -> ListerResult<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        ListerError::Validation(format!("manifest path '{}' has no file name", path.display()))
    })?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(name);
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git_providers::types::FileDescriptor;

    fn listing() -> FileListing {
        FileListing::new(vec![
            FileDescriptor {
                download_url: "https://raw.example.com/acme/lib/main/src/B.java".into(),
                path: Some("src/B.java".into()),
                name: Some("B.java".into()),
                size: Some(42),
                sha: Some("b".into()),
            },
            FileDescriptor::from_url("https://raw.example.com/acme/lib/main/src/A.java"),
        ])
    }

    #[test]
    fn round_trip_preserves_entries_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MANIFEST_FILE);

        let original = listing();
        save_manifest(&path, &original).unwrap();
        let loaded = load_manifest(&path).unwrap();

        assert_eq!(loaded, original);
        assert!(!dir.path().join(".download_urls.json.tmp").exists());
    }

    #[test]
    fn saving_same_listing_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");

        save_manifest(&path, &listing()).unwrap();
        let first = fs::read(&path).unwrap();
        save_manifest(&path, &listing()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn on_disk_shape_is_array_of_objects_with_download_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        save_manifest(&path, &listing()).unwrap();

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        let arr = raw.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert!(arr.iter().all(|o| o["download_url"].is_string()));
    }

    #[test]
    fn loads_minimal_foreign_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        fs::write(
            &path,
            r#"[{"download_url":"https://x/a.java","type":"file"},{"download_url":"https://x/b.java"}]"#,
        )
        .unwrap();

        let loaded = load_manifest(&path).unwrap();
        let ids: Vec<_> = loaded.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["https://x/a.java", "https://x/b.java"]);
    }

    #[test]
    fn rejects_duplicates_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        fs::write(&path, r#"[{"download_url":"u"},{"download_url":"u"}]"#).unwrap();
        assert!(matches!(load_manifest(&path), Err(ListerError::Validation(_))));

        assert!(matches!(
            load_manifest(dir.path().join("absent.json")),
            Err(ListerError::Manifest(_))
        ));
    }

    #[test]
    fn failed_write_keeps_previous_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        save_manifest(&path, &listing()).unwrap();
        let before = fs::read(&path).unwrap();

        // A directory squatting on the temp name makes File::create fail.
        fs::create_dir(dir.path().join(".m.json.tmp")).unwrap();
        assert!(save_manifest(&path, &FileListing::default()).is_err());
        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
