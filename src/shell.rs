// shell.rs

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::{ErrorKind, ShellError};
use crate::history::History;
use crate::parser::parse_command;
use crate::trash::TrashStore;
use crate::undo::{PendingRecord, UndoLedger};
use crate::util::writeln_ignore_broken_pipe;

pub const COMMANDS: &[&str] = &[
    "ls", "cd", "cat", "cp", "mv", "rm", "zip", "unzip", "tar", "untar", "grep", "history",
    "clear_history", "undo", "trash", "empty_trash", "exit", "quit",
];

/// Source of answers for interactive confirmations.
pub trait Prompt {
    /// `None` when no answer could be read (interrupt, end of input).
    fn ask(&mut self, question: &str) -> Option<String>;
}

/// How a handler finished when it did not fail.
#[derive(Debug)]
pub enum Outcome {
    Done,
    /// A reversible mutation happened; the dispatcher links it to history.
    Reversible(PendingRecord),
    /// Nothing went wrong, but the command did not do its job
    /// (cancelled confirmation, no search matches, unknown command).
    Declined,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    Exit,
}

/// One interactive session: the working directory plus the history log, undo
/// ledger and trash it owns. Output goes to `out`.
pub struct Shell<W: Write> {
    pub(crate) cwd: PathBuf,
    pub(crate) history: History,
    pub(crate) ledger: UndoLedger,
    pub(crate) trash: TrashStore,
    out: W,
    last_error: Option<ErrorKind>,
}

impl<W: Write> Shell<W> {
    /// Opens the history file and trash under `data_dir`. A relative `data_dir`
    /// is taken against the process working directory once, here.
    pub fn open(data_dir: &Path, cwd: PathBuf, out: W) -> io::Result<Self> {
        let data_dir = std::path::absolute(data_dir)?;
        let history = History::load(data_dir.join(".history"));
        let trash = TrashStore::open(data_dir.join(".trash"))?;
        info!(data_dir = %data_dir.display(), entries = history.len(), "shell opened");
        Ok(Self { cwd, history, ledger: UndoLedger::new(), trash, out, last_error: None })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn ledger(&self) -> &UndoLedger {
        &self.ledger
    }

    pub fn trash(&self) -> &TrashStore {
        &self.trash
    }

    /// Kind of the failure reported by the most recent line, if it failed with one.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Runs one raw command line to completion.
    ///
    /// The line is appended to history after the handler ran, and a reversible
    /// result is then stamped with the index that append returned. `undo` and
    /// `clear_history` retract history instead of adding to it.
    pub fn execute_line(&mut self, line: &str, prompt: &mut dyn Prompt) -> Status {
        self.last_error = None;
        let line = line.trim();
        if line.is_empty() {
            return Status::Success;
        }
        let (cmd, args) = match parse_command(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return Status::Success,
            Err(e) => {
                self.history.append(line);
                self.report(&e);
                error!(line, error = %e, "cannot parse command");
                return Status::Failure;
            }
        };

        if cmd == "exit" || cmd == "quit" {
            self.history.append(line);
            info!("exit requested");
            return Status::Exit;
        }

        let result = self.dispatch(&cmd, &args, prompt);
        let index = match cmd.as_str() {
            "undo" | "clear_history" => None,
            _ => Some(self.history.append(line)),
        };

        match result {
            Ok(Outcome::Done) => Status::Success,
            Ok(Outcome::Reversible(pending)) => {
                let record = pending.finalize(index);
                info!(kind = %record.kind, history_index = ?record.history_index, "recorded for undo");
                self.ledger.push(record);
                Status::Success
            }
            Ok(Outcome::Declined) => Status::Failure,
            Err(e) => {
                self.report(&e);
                error!(command = %cmd, args = ?args, error = %e, "command failed");
                Status::Failure
            }
        }
    }

    fn dispatch(&mut self, cmd: &str, args: &[String], prompt: &mut dyn Prompt) -> Result<Outcome, ShellError> {
        match cmd {
            "ls" => self.ls(args),
            "cd" => self.cd(args),
            "cat" => self.cat(args),
            "cp" => self.cp(args),
            "mv" => self.mv(args),
            "rm" => self.rm(args, prompt),
            "zip" => self.zip(args),
            "unzip" => self.unzip(args),
            "tar" => self.tar(args),
            "untar" => self.untar(args),
            "grep" => self.grep(args),
            "history" => self.show_history(args),
            "clear_history" => self.clear_history(),
            "undo" => self.undo(args),
            "trash" => self.list_trash(),
            "empty_trash" => self.empty_trash(),
            other => {
                warn!(command = other, "unknown command");
                self.say(format!("Unknown command: {}", other));
                Ok(Outcome::Declined)
            }
        }
    }

    pub(crate) fn say(&mut self, msg: impl AsRef<str>) {
        if let Err(e) = writeln_ignore_broken_pipe(&mut self.out, msg) {
            warn!(error = %e, "cannot write output");
        }
    }

    fn report(&mut self, err: &ShellError) {
        self.last_error = Some(err.kind());
        self.say(format!("Error: {}", err));
    }
}

/// Answers every question with the next scripted reply. Handy for scripts and tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: std::collections::VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { answers: answers.into_iter().map(Into::into).collect(), asked: Vec::new() }
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> Option<String> {
        self.asked.push(question.to_string());
        self.answers.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::OperationKind;
    use std::fs;
    use tempfile::TempDir;

    fn shell(tmp: &TempDir) -> Shell<Vec<u8>> {
        let work = tmp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        Shell::open(&tmp.path().join("data"), work, Vec::new()).unwrap()
    }

    fn output(shell: &Shell<Vec<u8>>) -> String {
        String::from_utf8_lossy(shell.output()).into_owned()
    }

    #[test]
    fn every_line_but_undo_lands_in_history() {
        let tmp = TempDir::new().unwrap();
        let mut sh = shell(&tmp);
        let mut prompt = ScriptedPrompt::default();

        assert_eq!(sh.execute_line("frobnicate", &mut prompt), Status::Failure);
        assert_eq!(sh.execute_line("cat \"unterminated", &mut prompt), Status::Failure);
        assert_eq!(sh.execute_line("   ", &mut prompt), Status::Success);
        assert_eq!(sh.execute_line("undo", &mut prompt), Status::Failure);
        assert_eq!(sh.history().list(None), vec![(1, "frobnicate"), (2, "cat \"unterminated")]);
        assert!(output(&sh).contains("Unknown command: frobnicate"));
        assert!(output(&sh).contains("Error: nothing to undo"));
        assert_eq!(sh.last_error(), Some(ErrorKind::EmptyLedger));
    }

    #[test]
    fn reversible_command_is_stamped_with_its_history_index() {
        let tmp = TempDir::new().unwrap();
        let mut sh = shell(&tmp);
        let mut prompt = ScriptedPrompt::default();
        fs::write(sh.cwd().join("a.txt"), "A").unwrap();

        sh.execute_line("ls", &mut prompt);
        assert_eq!(sh.execute_line("cp a.txt b.txt", &mut prompt), Status::Success);

        let top = sh.ledger().peek().unwrap();
        assert_eq!(top.kind, OperationKind::Copy);
        assert_eq!(top.history_index, Some(2));
        assert_eq!(sh.history().get(2), Some("cp a.txt b.txt"));
    }

    #[test]
    fn clear_history_unlinks_ledger() {
        let tmp = TempDir::new().unwrap();
        let mut sh = shell(&tmp);
        let mut prompt = ScriptedPrompt::default();
        fs::write(sh.cwd().join("a.txt"), "A").unwrap();

        sh.execute_line("cp a.txt b.txt", &mut prompt);
        assert_eq!(sh.execute_line("clear_history", &mut prompt), Status::Success);
        assert!(sh.history().is_empty());
        sh.execute_line("ls", &mut prompt);

        assert_eq!(sh.execute_line("undo", &mut prompt), Status::Success);
        assert_eq!(sh.history().list(None), vec![(1, "ls")]);
        assert!(!sh.cwd().join("b.txt").exists());
    }

    #[test]
    fn exit_ends_the_session() {
        let tmp = TempDir::new().unwrap();
        let mut sh = shell(&tmp);
        assert_eq!(sh.execute_line("EXIT", &mut ScriptedPrompt::default()), Status::Exit);
        assert_eq!(sh.history().len(), 1);
    }
}
