//! An interactive file-management shell whose destructive commands can be
//! undone.
//!
//! [`Shell`] owns the persisted command [`History`], the in-memory
//! [`UndoLedger`] and the [`TrashStore`] that keeps deleted directories around.
//! Each reversible command yields a [`PendingRecord`]; the shell appends the
//! command line to history and only then stamps the record with the index it
//! got, so `undo` always retracts exactly the entry of the command it reverses.

pub mod archive;
pub mod builtins;
pub mod completion;
pub mod config;
pub mod error;
pub mod fsops;
pub mod history;
pub mod listing;
pub mod logging;
pub mod parser;
pub mod paths;
pub mod repl;
pub mod search;
pub mod shell;
pub mod trash;
pub mod undo;
pub mod util;

pub use error::{ErrorKind, Result, ShellError};
pub use history::History;
pub use shell::{Outcome, Prompt, ScriptedPrompt, Shell, Status};
pub use trash::TrashStore;
pub use undo::{OperationKind, PendingRecord, UndoLedger, UndoRecord};
