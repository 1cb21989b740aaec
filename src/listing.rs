use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::{debug, error};

use crate::error::Result;

/// One child of a listed directory.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    /// Logical path of the entry, for building links.
    pub path: String,
    pub is_dir: bool,
    /// Bytes, files only.
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
}

/// Lists the immediate children of `dir`, skipping dot-files.
///
/// Entries come back in the order the OS enumerates them. If any entry
/// cannot be stat'ed the whole listing fails; a partial view of a directory
/// is never returned.
pub async fn list(dir: &Path, logical_dir: &str) -> Result<Vec<DirectoryEntry>> {
    let mut reader = fs::read_dir(dir).await.map_err(|e| {
        error!("Failed to read directory {}: {}", dir.display(), e);
        e
    })?;

    let base = logical_dir.trim_end_matches('/');
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            debug!("Skipping hidden entry {}", name);
            continue;
        }

        // fs::metadata follows symlinks, so a link to a directory lists as one.
        let metadata = fs::metadata(entry.path()).await.map_err(|e| {
            error!("Failed to get metadata for {}: {}", entry.path().display(), e);
            e
        })?;

        let is_dir = metadata.is_dir();
        entries.push(DirectoryEntry {
            path: format!("{}/{}", base, name),
            size: (!is_dir).then(|| metadata.len()),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            is_dir,
            name,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShareError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn lists_files_and_dirs_without_hidden() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), vec![b'x'; 100]).unwrap();
        std::fs::write(dir.path().join(".hidden"), b"secret").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let mut entries = list(dir.path(), "/").await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert!(!entries[0].is_dir);
        assert_eq!(entries[0].size, Some(100));
        assert_eq!(entries[0].path, "/a.txt");
        assert!(entries[0].modified.is_some());

        assert_eq!(entries[1].name, "sub");
        assert!(entries[1].is_dir);
        assert_eq!(entries[1].size, None);
    }

    #[tokio::test]
    async fn entry_paths_extend_the_logical_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.md"), b"# hi").unwrap();

        let entries = list(dir.path(), "/docs/").await.unwrap();
        assert_eq!(entries[0].path, "/docs/notes.md");
    }

    #[tokio::test]
    async fn empty_directory_lists_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(list(dir.path(), "/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_directory_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = list(&dir.path().join("gone"), "/gone").await.unwrap_err();
        assert!(matches!(err, ShareError::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn one_bad_entry_fails_the_listing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ok.txt"), b"ok").unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("dangling"))
            .unwrap();

        let err = list(dir.path(), "/").await.unwrap_err();
        assert!(matches!(err, ShareError::Io(_)));
    }
}
