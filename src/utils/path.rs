//! Filesystem path helpers.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first, falling back to joining with cwd.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Join a client-supplied relative path onto `root`, refusing anything that
/// would leave it.
///
/// Rejects absolute paths, `..` that climbs above `root` and paths that
/// resolve to `root` itself. When the target
/// exists it is canonicalized too, so symlinks pointing outside are
/// rejected as well. A missing target inside `root` is returned as is.
pub fn confine(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !clean.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        return None;
    }

    let joined = root.join(&clean);
    if !joined.exists() {
        return Some(joined);
    }

    let canonical = joined.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    canonical.starts_with(&root_canonical).then_some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_confine_inside() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("html")).unwrap();
        fs::write(dir.path().join("html/index.html"), "<p>").unwrap();

        let found = confine(dir.path(), "html/index.html").unwrap();
        assert!(found.ends_with("html/index.html"));

        let found = confine(dir.path(), "./html/../html/index.html").unwrap();
        assert!(found.ends_with("html/index.html"));
    }

    #[test]
    fn test_confine_missing_inside() {
        let dir = tempfile::tempdir().unwrap();
        let path = confine(dir.path(), "GETTING STARTED/1. Install.txt").unwrap();
        assert_eq!(path, dir.path().join("GETTING STARTED/1. Install.txt"));
    }

    #[test]
    fn test_confine_rejects_escape() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(confine(dir.path(), "../secret.txt"), None);
        assert_eq!(confine(dir.path(), "a/../../secret.txt"), None);
        assert_eq!(confine(dir.path(), "/etc/passwd"), None);
    }

    #[test]
    fn test_confine_rejects_root_itself() {
        let dir = tempfile::tempdir().unwrap();
        for path in ["a/..", ".", "./", "a/b/../.."] {
            assert_eq!(confine(dir.path(), path), None, "{path}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_confine_rejects_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "x").unwrap();

        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();

        assert_eq!(confine(root.path(), "link/secret.txt"), None);
    }
}
