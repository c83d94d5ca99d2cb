// history.rs

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tempfile::NamedTempFile;
use tracing::{debug, error};

use crate::error::ShellError;

/// Persisted, 1-indexed log of raw command lines.
///
/// Every mutation rewrites the whole backing file. Persistence failures are
/// logged and swallowed: the in-memory list stays authoritative for the session.
pub struct History {
    entries: Vec<String>,
    path: PathBuf,
}

impl History {
    /// Loads `path`, starting empty when it is missing or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                error!(path = %path.display(), error = %ShellError::Persistence(e), "failed to load history");
                Vec::new()
            }
        };
        debug!(path = %path.display(), count = entries.len(), "history loaded");
        Self { entries, path }
    }

    /// Appends `text` and returns its 1-based index.
    pub fn append(&mut self, text: &str) -> usize {
        // the file is line oriented, an embedded newline would split the entry
        let line = text.lines().map(str::trim).filter(|l| !l.is_empty()).join(" ");
        self.entries.push(line);
        self.save();
        self.entries.len()
    }

    /// Entries with their true indices. `None` or a non-positive limit means all,
    /// otherwise only the last `limit` entries.
    pub fn list(&self, limit: Option<i64>) -> Vec<(usize, &str)> {
        let start = match limit {
            Some(n) if n > 0 => self.entries.len().saturating_sub(n as usize),
            _ => 0,
        };
        self.entries
            .iter()
            .enumerate()
            .skip(start)
            .map(|(i, text)| (i + 1, text.as_str()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    /// Removes the entry at 1-based `index`. Later entries shift down by one.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index == 0 || index > self.entries.len() {
            return false;
        }
        self.entries.remove(index - 1);
        self.save();
        true
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        index.checked_sub(1).and_then(|i| self.entries.get(i)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) {
        if let Err(e) = write_entries(&self.path, &self.entries) {
            error!(path = %self.path.display(), error = %ShellError::Persistence(e), "failed to save history");
        }
    }
}

fn read_entries(path: &Path) -> io::Result<Vec<String>> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            entries.push(trimmed.to_string());
        }
    }
    Ok(entries)
}

/// Full rewrite through a temp file in the same directory, renamed over the
/// original so a crash never leaves a truncated log behind.
fn write_entries(path: &Path, entries: &[String]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    for entry in entries {
        writeln!(tmp, "{}", entry)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), count = entries.len(), "history saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fresh() -> (TempDir, History) {
        let dir = TempDir::new().unwrap();
        let history = History::load(dir.path().join(".history"));
        (dir, history)
    }

    #[test]
    fn append_assigns_contiguous_indices() {
        let (_dir, mut h) = fresh();
        assert_eq!(h.append("x"), 1);
        assert_eq!(h.append("y"), 2);
        assert_eq!(h.append("z"), 3);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn list_limit_keeps_true_indices() {
        let (_dir, mut h) = fresh();
        for cmd in ["x", "y", "z"] {
            h.append(cmd);
        }
        assert_eq!(h.list(Some(2)), vec![(2, "y"), (3, "z")]);
        assert_eq!(h.list(Some(0)), vec![(1, "x"), (2, "y"), (3, "z")]);
        assert_eq!(h.list(None), h.list(Some(0)));
        assert_eq!(h.list(Some(-4)).len(), 3);
        assert_eq!(h.list(Some(10)).len(), 3);
    }

    #[test]
    fn remove_at_bounds() {
        let (_dir, mut h) = fresh();
        h.append("a");
        h.append("b");
        assert!(!h.remove_at(0));
        assert!(!h.remove_at(3));
        assert!(h.remove_at(1));
        assert_eq!(h.list(None), vec![(1, "b")]);
    }

    #[test]
    fn persists_across_reload() {
        let (dir, mut h) = fresh();
        h.append("ls -l");
        h.append("cd  docs ");
        h.remove_at(1);
        let reloaded = History::load(dir.path().join(".history"));
        assert_eq!(reloaded.list(None), vec![(1, "cd  docs")]);

        h.clear();
        let reloaded = History::load(dir.path().join(".history"));
        assert!(reloaded.is_empty());
        assert_eq!(fs::read_to_string(h.path()).unwrap(), "");
    }

    #[test]
    fn embedded_newlines_are_folded() {
        let (dir, mut h) = fresh();
        h.append("echo a\nb");
        let reloaded = History::load(dir.path().join(".history"));
        assert_eq!(reloaded.get(1), Some("echo a b"));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn unreadable_store_starts_empty() {
        let dir = TempDir::new().unwrap();
        // a directory where the file should be cannot be read as lines
        let path = dir.path().join(".history");
        fs::create_dir(&path).unwrap();
        let mut h = History::load(&path);
        assert!(h.is_empty());
        // saving fails too, but the session keeps going
        assert_eq!(h.append("still works"), 1);
        assert_eq!(h.get(1), Some("still works"));
    }

    #[test]
    fn skips_blank_lines_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".history");
        fs::write(&path, "one\n\n   \ntwo\n").unwrap();
        let h = History::load(&path);
        assert_eq!(h.list(None), vec![(1, "one"), (2, "two")]);
    }
}
