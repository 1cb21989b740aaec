//! Maps client-supplied logical paths onto the shared directory.
//!
//! A logical path is slash separated and rooted at the serve root, so `/`,
//! the empty string and `.` all name the root itself. `..` segments collapse
//! against earlier segments; one that would climb above the root is a
//! traversal attempt and the whole request is refused.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::{Result, ShareError};

/// Resolves `logical` against `root` (which must already be canonical).
///
/// Existing targets are canonicalized as well, so a symlink inside the tree
/// that points outside of it is refused just like a `..` escape.
pub fn resolve(root: &Path, logical: &str) -> Result<PathBuf> {
    let relative = normalize(logical)?;
    let joined = root.join(&relative);

    match joined.canonicalize() {
        Ok(canonical) if canonical.starts_with(root) => Ok(canonical),
        Ok(canonical) => {
            warn!(
                "Path traversal attempt: '{}' resolved to '{}' which is outside root '{}'",
                logical,
                canonical.display(),
                root.display()
            );
            Err(ShareError::Traversal)
        }
        // Not there yet: the closest existing ancestor must still be inside
        // the root, callers decide what a missing path means.
        Err(_) => {
            let anchored = joined
                .ancestors()
                .skip(1)
                .find_map(|ancestor| ancestor.canonicalize().ok())
                .is_some_and(|ancestor| ancestor.starts_with(root));
            if anchored {
                Ok(joined)
            } else {
                warn!(
                    "Path traversal attempt: '{}' has an ancestor outside root '{}'",
                    logical,
                    root.display()
                );
                Err(ShareError::Traversal)
            }
        }
    }
}

/// Collapses `logical` into a root-relative path without touching the disk.
fn normalize(logical: &str) -> Result<PathBuf> {
    if logical.contains('\0') {
        warn!("Path contains a NUL byte: {:?}", logical);
        return Err(ShareError::Traversal);
    }

    let mut clean = PathBuf::new();
    for component in Path::new(logical.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !clean.pop() {
                    warn!("Path traversal attempt: '{}' climbs above root", logical);
                    return Err(ShareError::Traversal);
                }
            }
            // Leading slashes are stripped above, so these only show up as
            // drive prefixes or UNC roots.
            Component::RootDir | Component::Prefix(_) => {
                warn!("Absolute path override in '{}'", logical);
                return Err(ShareError::Traversal);
            }
        }
    }
    Ok(clean)
}

/// Turns a root-relative path back into the `/a/b` form used in URLs.
pub fn to_logical(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("/{}", parts.join("/"))
}

/// The logical form of an absolute path under `root`.
pub fn logical_of(root: &Path, full: &Path) -> String {
    full.strip_prefix(root)
        .map(to_logical)
        .unwrap_or_else(|_| "/".to_string())
}

/// Parent of a logical path, or `None` at the root.
pub fn logical_parent(logical: &str) -> Option<String> {
    let trimmed = logical.trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rsplit_once('/') {
        Some((parent, _)) => Some(format!("/{}", parent)),
        None => Some("/".to_string()),
    }
}
