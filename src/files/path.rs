//! Requested path resolution
//!
//! A requested path is accepted only if it stays under the root directory,
//! first lexically (before touching the filesystem) and then again after
//! symlinks are resolved.

use crate::error::{FileServerError, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Normalize a caller-supplied path into a relative path with no `.`/`..`
///
/// Returns `None` for empty paths, NUL bytes, absolute paths and any `..`
/// that would climb above the root.
pub fn normalize(requested: &str) -> Option<PathBuf> {
    if requested.contains('\0') {
        return None;
    }

    let mut relative = PathBuf::new();
    for component in Path::new(requested).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !relative.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

/// Resolve `requested` to a canonical regular file under `root`
///
/// `root` must already be canonical.
pub async fn resolve(root: &Path, requested: &str) -> Result<PathBuf> {
    let relative =
        normalize(requested).ok_or_else(|| FileServerError::InvalidPath(requested.to_string()))?;

    let canonical = match fs::canonicalize(root.join(&relative)).await {
        Ok(p) => p,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // A dangling symlink must not reveal whether its target exists
            if has_symlink_component(root, &relative).await {
                return Err(FileServerError::InvalidPath(requested.to_string()));
            }
            return Err(FileServerError::NotFound(requested.to_string()));
        }
        Err(e) => return Err(FileServerError::Io(e)),
    };

    // Symlinks may point anywhere
    if !canonical.starts_with(root) {
        return Err(FileServerError::InvalidPath(requested.to_string()));
    }

    let metadata = fs::metadata(&canonical).await?;
    if !metadata.is_file() {
        return Err(FileServerError::NotFound(requested.to_string()));
    }

    Ok(canonical)
}

/// Whether any existing prefix of `relative` under `root` is a symlink
async fn has_symlink_component(root: &Path, relative: &Path) -> bool {
    let mut current = root.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match fs::symlink_metadata(&current).await {
            Ok(meta) if meta.file_type().is_symlink() => return true,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain() {
        assert_eq!(normalize("job123.log"), Some(PathBuf::from("job123.log")));
        assert_eq!(
            normalize("./jobs/a/stdout"),
            Some(PathBuf::from("jobs/a/stdout"))
        );
        assert_eq!(normalize("jobs/../b.log"), Some(PathBuf::from("b.log")));
    }

    #[test]
    fn test_normalize_rejects_escape() {
        assert_eq!(normalize("../../etc/passwd"), None);
        assert_eq!(normalize("jobs/../../secret"), None);
        assert_eq!(normalize("/etc/passwd"), None);
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("."), None);
        assert_eq!(normalize("a\0b"), None);
    }

    #[tokio::test]
    async fn test_resolve_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir(root.join("jobs")).unwrap();
        std::fs::write(root.join("jobs/1.log"), b"x").unwrap();

        let resolved = resolve(&root, "jobs/1.log").await.unwrap();
        assert_eq!(resolved, root.join("jobs/1.log"));
    }

    #[tokio::test]
    async fn test_resolve_missing_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir(root.join("jobs")).unwrap();

        assert!(matches!(
            resolve(&root, "missing.log").await,
            Err(FileServerError::NotFound(_))
        ));
        assert!(matches!(
            resolve(&root, "jobs").await,
            Err(FileServerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();

        assert!(matches!(
            resolve(&root, "../../etc/passwd").await,
            Err(FileServerError::InvalidPath(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret"), b"s").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret"), root.join("link.log")).unwrap();

        assert!(matches!(
            resolve(&root, "link.log").await,
            Err(FileServerError::InvalidPath(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_dangling_symlink_matches_escape() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("exists"), b"s").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::os::unix::fs::symlink(outside.path().join("exists"), root.join("a.log")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("missing"), root.join("b.log")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("gone"), root.join("jobs")).unwrap();

        for requested in ["a.log", "b.log", "jobs/1.log"] {
            assert!(
                matches!(
                    resolve(&root, requested).await,
                    Err(FileServerError::InvalidPath(_))
                ),
                "{requested}"
            );
        }
        assert!(matches!(
            resolve(&root, "plain/missing.log").await,
            Err(FileServerError::NotFound(_))
        ));
    }
}
