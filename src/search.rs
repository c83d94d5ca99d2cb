// search.rs

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Result, ShellError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub path: PathBuf,
    pub line_number: usize,
    pub line: String,
}

pub fn compile(pattern: &str, ignore_case: bool) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(ignore_case).build()?)
}

/// Searches a file, or the files of a directory (descending only when
/// `recursive`). Unreadable files are skipped with a warning.
pub fn grep(regex: &Regex, target: &Path, recursive: bool) -> Result<Vec<Match>> {
    if target.is_file() {
        return Ok(search_file(regex, target));
    }
    if !target.is_dir() {
        return Err(ShellError::NotFound(target.to_path_buf()));
    }
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut matches = Vec::new();
    for entry in WalkDir::new(target).min_depth(1).max_depth(max_depth).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => matches.extend(search_file(regex, entry.path())),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "skipping unreadable entry"),
        }
    }
    Ok(matches)
}

fn search_file(regex: &Regex, path: &Path) -> Vec<Match> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read file");
            return Vec::new();
        }
    };
    String::from_utf8_lossy(&bytes)
        .lines()
        .enumerate()
        .filter(|(_, line)| regex.is_match(line))
        .map(|(i, line)| Match { path: path.to_path_buf(), line_number: i + 1, line: line.trim().to_string() })
        .collect()
}
