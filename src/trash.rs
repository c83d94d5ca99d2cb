// trash.rs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, ShellError};
use crate::fsops;
use crate::paths::{base_name, ensure_absent};

/// Holding area for deleted content that may still be restored by `undo`.
pub struct TrashStore {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashEntry {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

impl TrashStore {
    /// Creates the store directory if needed. The root is kept canonical so it
    /// can be compared against canonical paths of removal targets.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let root = fs::canonicalize(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies `original` into the store, then removes it. Returns where the copy
    /// lives. The original is only removed once the copy is complete.
    pub fn place(&self, original: &Path) -> Result<PathBuf> {
        if original.symlink_metadata().is_err() {
            return Err(ShellError::NotFound(original.to_path_buf()));
        }
        let slot = self.free_slot(&base_name(original));
        if let Err(e) = fsops::copy_any(original, &slot) {
            if slot.symlink_metadata().is_ok() {
                if let Err(cleanup) = fsops::remove_any(&slot) {
                    warn!(slot = %slot.display(), error = %cleanup, "partial trash copy left behind");
                }
            }
            return Err(e.into());
        }
        fsops::remove_any(original)?;
        info!(original = %original.display(), slot = %slot.display(), "moved to trash");
        Ok(slot)
    }

    /// Copies `relocated` back to `original`, recreating missing parents.
    /// The trashed copy stays in place. Refuses when `original` is occupied again.
    pub fn restore(&self, relocated: &Path, original: &Path) -> Result<()> {
        if relocated.symlink_metadata().is_err() {
            return Err(ShellError::NotFound(relocated.to_path_buf()));
        }
        ensure_absent(original)?;
        if let Some(parent) = original.parent() {
            fs::create_dir_all(parent)?;
        }
        fsops::copy_any(relocated, original)?;
        info!(slot = %relocated.display(), original = %original.display(), "restored from trash");
        Ok(())
    }

    pub fn entries(&self) -> Result<Vec<TrashEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            entries.push(TrashEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: fsops::disk_usage(&path),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Deletes everything held in the store. Returns the number of entries removed.
    pub fn purge(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            fsops::remove_any(&entry?.path())?;
            removed += 1;
        }
        info!(removed, "trash emptied");
        Ok(removed)
    }

    /// `<root>/<name>`, or `<root>/<name>_<n>` with the smallest free `n`.
    fn free_slot(&self, name: &str) -> PathBuf {
        let mut slot = self.root.join(name);
        let mut counter = 1;
        while slot.symlink_metadata().is_ok() {
            slot = self.root.join(format!("{}_{}", name, counter));
            counter += 1;
        }
        debug!(slot = %slot.display(), "picked trash slot");
        slot
    }
}
