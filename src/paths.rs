// paths.rs

use std::env;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, ShellError};

/// Resolves a user supplied path against the shell's working directory.
///
/// `~` and `~/...` expand to `$HOME`. The result is absolute and lexically
/// normalized (`.` dropped, `..` pops a component) without touching the disk,
/// so it also works for paths that do not exist yet.
pub fn resolve(cwd: &Path, raw: &str) -> PathBuf {
    let expanded = expand_home(raw);
    let joined = if expanded.is_absolute() { expanded } else { cwd.join(expanded) };
    normalize(&joined)
}

fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = env::var_os("HOME") {
            let home = PathBuf::from(home);
            return if raw == "~" { home } else { home.join(&raw[2..]) };
        }
    }
    PathBuf::from(raw)
}

pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // popping past the root is a no-op, like `cd /..`
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Rejects the filesystem root and arguments ending in a parent-traversal
/// marker. Runs before anything is touched.
pub fn ensure_not_root(raw: &str, resolved: &Path) -> Result<()> {
    let trimmed = raw.trim_end_matches(['/', '\\']);
    if trimmed == ".." || trimmed.ends_with("/..") || trimmed.ends_with("\\..") {
        return Err(ShellError::PermissionDenied {
            path: resolved.to_path_buf(),
            reason: "refusing to operate on a parent directory",
        });
    }
    reject_root(resolved)
}

/// Root-only half of [`ensure_not_root`], for destinations where `..` is fine.
pub fn reject_root(resolved: &Path) -> Result<()> {
    if resolved.parent().is_none() {
        return Err(ShellError::PermissionDenied {
            path: resolved.to_path_buf(),
            reason: "refusing to operate on the root directory",
        });
    }
    Ok(())
}

pub fn ensure_exists(path: &Path) -> Result<()> {
    // a dangling symlink still counts as something to operate on
    if path.exists() || path.symlink_metadata().is_ok() {
        Ok(())
    } else {
        Err(ShellError::NotFound(path.to_path_buf()))
    }
}

pub fn ensure_is_dir(path: &Path) -> Result<()> {
    ensure_exists(path)?;
    if path.is_dir() {
        Ok(())
    } else {
        Err(ShellError::NotADirectory(path.to_path_buf()))
    }
}

pub fn ensure_is_file(path: &Path) -> Result<()> {
    ensure_exists(path)?;
    if path.is_file() {
        Ok(())
    } else {
        Err(ShellError::NotAFile(path.to_path_buf()))
    }
}

/// Fails when anything, a dangling symlink included, already occupies `path`.
pub fn ensure_absent(path: &Path) -> Result<()> {
    if path.symlink_metadata().is_ok() {
        return Err(ShellError::AlreadyExists(path.to_path_buf()));
    }
    Ok(())
}

/// Rejects `src` and `dst` naming the same file, by path or by device and inode.
pub fn ensure_distinct(src: &Path, dst: &Path) -> Result<()> {
    let same = src == dst
        || match (fs::metadata(src), fs::metadata(dst)) {
            (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
            _ => false,
        };
    if same {
        return Err(ShellError::SameFile { src: src.to_path_buf(), dst: dst.to_path_buf() });
    }
    Ok(())
}

/// Last component of a path as a lossy string, or the whole path when it has none.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn resolve_joins_and_normalizes() {
        let cwd = Path::new("/work/dir");
        assert_eq!(resolve(cwd, "a/./b/../c.txt"), PathBuf::from("/work/dir/a/c.txt"));
        assert_eq!(resolve(cwd, "/etc/hosts"), PathBuf::from("/etc/hosts"));
        assert_eq!(resolve(cwd, "../.."), PathBuf::from("/"));
        assert_eq!(resolve(cwd, "../../../.."), PathBuf::from("/"));
    }

    #[test]
    fn guard_rejects_root_and_parent_markers() {
        let cwd = Path::new("/work/dir");
        let root = resolve(cwd, "/");
        assert_eq!(ensure_not_root("/", &root).unwrap_err().kind(), ErrorKind::PermissionDenied);

        let parent = resolve(cwd, "..");
        assert_eq!(ensure_not_root("..", &parent).unwrap_err().kind(), ErrorKind::PermissionDenied);
        let nested = resolve(cwd, "x/..");
        assert_eq!(ensure_not_root("x/../", &nested).unwrap_err().kind(), ErrorKind::PermissionDenied);

        let ok = resolve(cwd, "file..txt");
        assert!(ensure_not_root("file..txt", &ok).is_ok());
        assert!(reject_root(&parent).is_ok());
        assert!(reject_root(&root).is_err());
    }

    #[test]
    fn existence_and_type_checks() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(ensure_is_dir(dir.path()).is_ok());
        assert!(ensure_is_file(&file).is_ok());
        assert_eq!(ensure_is_dir(&file).unwrap_err().kind(), ErrorKind::NotADirectory);
        assert_eq!(ensure_is_file(dir.path()).unwrap_err().kind(), ErrorKind::NotAFile);
        assert_eq!(ensure_exists(&dir.path().join("nope")).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn occupied_and_identical_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        let link = dir.path().join("hard.txt");
        let dangling = dir.path().join("dangling");
        std::fs::write(&file, "x").unwrap();
        std::fs::hard_link(&file, &link).unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), &dangling).unwrap();

        assert_eq!(ensure_absent(&file).unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert_eq!(ensure_absent(&dangling).unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert!(ensure_absent(&dir.path().join("free")).is_ok());

        assert_eq!(ensure_distinct(&file, &file).unwrap_err().kind(), ErrorKind::SameFile);
        assert_eq!(ensure_distinct(&file, &link).unwrap_err().kind(), ErrorKind::SameFile);
        assert!(ensure_distinct(&file, &dir.path().join("free")).is_ok());
    }
}
