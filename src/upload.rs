use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tokio::fs;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::{Result, ShareError},
    resolve,
};

/// Result of a stored upload.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub file_name: String,
    /// Logical directory the file landed in.
    pub directory: String,
    pub bytes: u64,
}

/// Writes `content` as `file_name` inside the logical `target_dir`.
///
/// Missing directories are created. An existing file of the same name is
/// replaced; the bytes go to a hidden temp file first and are renamed into
/// place so readers see either the old or the new content.
pub async fn upload(
    root: &Path,
    target_dir: &str,
    file_name: &str,
    content: Bytes,
) -> Result<Accepted> {
    validate_file_name(file_name)?;
    let dir = resolve::resolve(root, target_dir)?;

    fs::create_dir_all(&dir).await.map_err(|e| {
        error!("Failed to create directory {}: {}", dir.display(), e);
        ShareError::Write(e.to_string())
    })?;

    let destination = dir.join(file_name);
    if fs::metadata(&destination)
        .await
        .is_ok_and(|metadata| metadata.is_dir())
    {
        return Err(ShareError::Write(format!(
            "\"{}\" is a directory",
            file_name
        )));
    }

    let temp_path = dir.join(format!(".upload-{}", Uuid::new_v4()));
    if let Err(e) = fs::write(&temp_path, &content).await {
        error!("Failed to write {}: {}", temp_path.display(), e);
        let _ = fs::remove_file(&temp_path).await;
        return Err(ShareError::Write(e.to_string()));
    }
    if let Err(e) = fs::rename(&temp_path, &destination).await {
        error!("Failed to move upload into {}: {}", destination.display(), e);
        let _ = fs::remove_file(&temp_path).await;
        return Err(ShareError::Write(e.to_string()));
    }

    info!(
        "Stored upload {} ({} bytes)",
        destination.display(),
        content.len()
    );

    Ok(Accepted {
        file_name: file_name.to_string(),
        directory: resolve::logical_of(root, &dir),
        bytes: content.len() as u64,
    })
}

/// Rejects names that would not stay a single entry inside the target
/// directory.
pub fn validate_file_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.len() > 255
        || name.chars().any(|c| c == '/' || c == '\\' || c.is_control());
    if bad {
        warn!("Rejected upload file name {:?}", name);
        return Err(ShareError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root() -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        (dir, canonical)
    }

    #[test]
    fn file_name_validation() {
        for ok in ["x.txt", "my report (final).pdf", "..hidden-ish", "ünïcødé.md"] {
            assert!(validate_file_name(ok).is_ok(), "{ok:?}");
        }
        for bad in [
            "",
            ".",
            "..",
            "../../etc/passwd",
            "a/b.txt",
            "..\\windows\\system32",
            "nul\0byte",
            "line\nbreak",
        ] {
            assert!(
                matches!(validate_file_name(bad), Err(ShareError::InvalidFileName(_))),
                "{bad:?}"
            );
        }
        assert!(validate_file_name(&"a".repeat(256)).is_err());
    }

    #[tokio::test]
    async fn creates_missing_directories() {
        let (_dir, root) = root();
        let accepted = upload(&root, "/docs/2024", "x.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        assert_eq!(accepted.file_name, "x.txt");
        assert_eq!(accepted.directory, "/docs/2024");
        assert_eq!(accepted.bytes, 5);
        assert_eq!(std::fs::read(root.join("docs/2024/x.txt")).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn second_upload_replaces_first() {
        let (_dir, root) = root();
        upload(&root, "/", "same.bin", Bytes::from(vec![1u8; 4096]))
            .await
            .unwrap();
        upload(&root, "/", "same.bin", Bytes::from_static(b"short"))
            .await
            .unwrap();

        assert_eq!(std::fs::read(root.join("same.bin")).unwrap(), b"short");
        // No temp files left behind.
        let names: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("same.bin")]);
    }

    #[tokio::test]
    async fn traversal_file_name_writes_nothing() {
        let (_dir, root) = root();
        std::fs::create_dir(root.join("docs")).unwrap();

        let err = upload(&root, "/docs", "../../etc/passwd", Bytes::from_static(b"pwned"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::InvalidFileName(_)));
        assert_eq!(std::fs::read_dir(root.join("docs")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn traversal_target_dir_is_refused() {
        let (_dir, root) = root();
        let err = upload(&root, "/../outside", "x.txt", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Traversal));
    }

    #[tokio::test]
    async fn existing_directory_is_not_replaced() {
        let (_dir, root) = root();
        std::fs::create_dir(root.join("taken")).unwrap();

        let err = upload(&root, "/", "taken", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Write(_)));
        assert!(root.join("taken").is_dir());
    }
}
