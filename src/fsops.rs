// fsops.rs

use std::fs;
use std::io;
use std::path::Path;

use nix::errno::Errno;
use tracing::debug;
use walkdir::WalkDir;

/// Copies a file or a whole directory tree. Existing directories at the
/// destination are merged into, existing files overwritten.
pub fn copy_any(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        copy_tree(src, dst)
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dst.join(rel);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    debug!(src = %src.display(), dst = %dst.display(), "copied tree");
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    let points_to = fs::read_link(link)?;
    if target.symlink_metadata().is_ok() {
        fs::remove_file(target)?;
    }
    std::os::unix::fs::symlink(points_to, target)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    fs::copy(link, target).map(|_| ())
}

/// Removes a file, a symlink, or a directory tree.
pub fn remove_any(path: &Path) -> io::Result<()> {
    let meta = path.symlink_metadata()?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Renames `src` to `dst`, falling back to copy + remove across filesystems.
pub fn move_path(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(Errno::EXDEV as i32) => {
            debug!(src = %src.display(), dst = %dst.display(), "cross-device move, copying");
            copy_any(src, dst)?;
            remove_any(src)
        }
        Err(e) => Err(e),
    }
}

/// Total size in bytes of a file or everything below a directory.
pub fn disk_usage(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.metadata().ok())
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tree(root: &Path) {
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("top.txt"), "top").unwrap();
        fs::write(root.join("sub/deeper/leaf.txt"), "leaf").unwrap();
    }

    #[test]
    fn copy_tree_reproduces_content() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        sample_tree(&src);
        let dst = tmp.path().join("dst");

        copy_any(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
        assert_eq!(fs::read_to_string(dst.join("sub/deeper/leaf.txt")).unwrap(), "leaf");
        assert!(src.join("top.txt").exists());
    }

    #[test]
    fn remove_any_handles_files_and_trees() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("tree");
        sample_tree(&dir);
        let file = tmp.path().join("f");
        fs::write(&file, "x").unwrap();

        remove_any(&dir).unwrap();
        remove_any(&file).unwrap();
        assert!(!dir.exists());
        assert!(!file.exists());
    }

    #[test]
    fn move_and_usage() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a");
        sample_tree(&src);
        assert_eq!(disk_usage(&src), 7);

        let dst = tmp.path().join("b");
        move_path(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
    }
}
