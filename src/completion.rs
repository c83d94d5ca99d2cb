// completion.rs

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

use crate::paths::resolve;
use crate::shell::COMMANDS;

/// Completes command names in the first word and paths, relative to the
/// shell's working directory, everywhere else.
pub struct ShellCompleter {
    cwd: RefCell<PathBuf>,
}

impl ShellCompleter {
    pub fn new(cwd: PathBuf) -> Self {
        Self { cwd: RefCell::new(cwd) }
    }

    pub fn set_cwd(&self, cwd: &Path) {
        *self.cwd.borrow_mut() = cwd.to_path_buf();
    }

    fn complete_command(&self, prefix: &str) -> Vec<Pair> {
        COMMANDS
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(|c| Pair { display: c.to_string(), replacement: format!("{} ", c) })
            .collect()
    }

    fn complete_path(&self, word: &str) -> Vec<Pair> {
        let (dir_part, prefix) = match word.rfind('/') {
            Some(i) => word.split_at(i + 1),
            None => ("", word),
        };
        let dir = resolve(&self.cwd.borrow(), if dir_part.is_empty() { "." } else { dir_part });
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut pairs: Vec<Pair> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                if !name.starts_with(prefix) || (name.starts_with('.') && !prefix.starts_with('.')) {
                    return None;
                }
                let is_dir = entry.path().is_dir();
                let replacement = format!("{}{}{}", dir_part, name, if is_dir { "/" } else { " " });
                Some(Pair { display: if is_dir { format!("{}/", name) } else { name }, replacement })
            })
            .collect();
        pairs.sort_by(|a, b| a.display.cmp(&b.display));
        pairs
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;
    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let before = &line[..pos];
        let start = before
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let word = &before[start..];
        if before[..start].trim().is_empty() {
            Ok((start, self.complete_command(word)))
        } else {
            Ok((start, self.complete_path(word)))
        }
    }
}

impl Hinter for ShellCompleter {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellCompleter {}

impl Validator for ShellCompleter {
    fn validate(&self, _ctx: &mut ValidationContext) -> Result<ValidationResult, ReadlineError> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for ShellCompleter {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn replacements(pairs: Vec<Pair>) -> Vec<String> {
        pairs.into_iter().map(|p| p.replacement).collect()
    }

    #[test]
    fn completes_command_names() {
        let c = ShellCompleter::new(PathBuf::from("/"));
        assert_eq!(replacements(c.complete_command("un")), ["unzip ", "untar "]);
        assert_eq!(replacements(c.complete_command("clear")), ["clear_history "]);
    }

    #[test]
    fn completes_paths_relative_to_cwd() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();
        fs::write(tmp.path().join("docs/readme.md"), "").unwrap();
        fs::write(tmp.path().join("data.csv"), "").unwrap();
        fs::write(tmp.path().join(".hidden"), "").unwrap();
        let c = ShellCompleter::new(tmp.path().to_path_buf());

        assert_eq!(replacements(c.complete_path("d")), ["data.csv ", "docs/"]);
        assert_eq!(replacements(c.complete_path("docs/r")), ["docs/readme.md "]);
        assert_eq!(replacements(c.complete_path(".h")), [".hidden "]);

        c.set_cwd(&tmp.path().join("docs"));
        assert_eq!(replacements(c.complete_path("")), ["readme.md "]);
    }
}
