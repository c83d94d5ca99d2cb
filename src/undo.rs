// undo.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::{Result, ShellError};
use crate::fsops;
use crate::history::History;
use crate::paths::ensure_absent;
use crate::trash::TrashStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Copy,
    Move,
    Delete,
    Archive,
}

impl FromStr for OperationKind {
    type Err = ShellError;

    /// Maps the command that performed an operation to its kind.
    fn from_str(command: &str) -> Result<Self> {
        match command {
            "cp" => Ok(OperationKind::Copy),
            "mv" => Ok(OperationKind::Move),
            "rm" => Ok(OperationKind::Delete),
            "zip" | "tar" => Ok(OperationKind::Archive),
            other => Err(ShellError::UnknownOperationKind(other.to_string())),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Copy => "copy",
            OperationKind::Move => "move",
            OperationKind::Delete => "delete",
            OperationKind::Archive => "archive",
        };
        f.write_str(name)
    }
}

/// A reversible operation that already happened.
///
/// For `Delete`, `source` is the trash slot and `destination` the original path.
/// For every other kind, `destination` is what the operation created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoRecord {
    pub kind: OperationKind,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub history_index: Option<usize>,
}

impl UndoRecord {
    /// What reversing this record did, for the user.
    pub fn summary(&self) -> String {
        match self.kind {
            OperationKind::Copy => format!("Undo copy: removed {}", self.destination.display()),
            OperationKind::Move => format!("Undo move: restored {}", self.source.display()),
            OperationKind::Delete => format!("Undo delete: restored {}", self.destination.display()),
            OperationKind::Archive => format!("Undo archive: removed {}", self.destination.display()),
        }
    }
}

/// An [`UndoRecord`] whose history index is not known yet. Handlers return
/// one; the dispatcher appends the command line and then calls [`Self::finalize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRecord {
    pub kind: OperationKind,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl PendingRecord {
    pub fn new(kind: OperationKind, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self { kind, source: source.into(), destination: destination.into() }
    }

    pub fn finalize(self, history_index: Option<usize>) -> UndoRecord {
        UndoRecord {
            kind: self.kind,
            source: self.source,
            destination: self.destination,
            history_index,
        }
    }
}

/// Single-level LIFO of reversible operations.
#[derive(Debug, Default)]
pub struct UndoLedger {
    records: Vec<UndoRecord>,
}

impl UndoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        kind: OperationKind,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        history_index: Option<usize>,
    ) {
        self.push(PendingRecord::new(kind, source, destination).finalize(history_index));
    }

    pub fn push(&mut self, record: UndoRecord) {
        self.records.push(record);
    }

    pub fn peek(&self) -> Option<&UndoRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forgets every history link. Used when the history is wiped, so an undo
    /// can never retract an unrelated entry that reused the index.
    pub fn unlink(&mut self) {
        for record in &mut self.records {
            record.history_index = None;
        }
    }

    /// Pops the newest record and reverses it. On success the linked history
    /// entry is removed and the reversed record returned. A failed reversal is
    /// not retried: the record stays popped and history is left alone.
    pub fn undo_last(&mut self, history: &mut History, trash: &TrashStore) -> Result<UndoRecord> {
        let record = self.records.pop().ok_or(ShellError::EmptyLedger)?;
        if let Err(e) = reverse(&record, trash) {
            warn!(kind = %record.kind, error = %e, "undo failed");
            return Err(e);
        }
        if let Some(index) = record.history_index {
            if !history.remove_at(index) {
                warn!(index, "linked history entry was already gone");
            }
        }
        info!(kind = %record.kind, destination = %record.destination.display(), "undo complete");
        Ok(record)
    }
}

fn reverse(record: &UndoRecord, trash: &TrashStore) -> Result<()> {
    match record.kind {
        OperationKind::Copy => remove_created(&record.destination),
        OperationKind::Move => move_back(&record.destination, &record.source),
        OperationKind::Delete => trash.restore(&record.source, &record.destination),
        OperationKind::Archive => remove_created(&record.destination),
    }
}

fn remove_created(path: &Path) -> Result<()> {
    if path.symlink_metadata().is_err() {
        return Err(ShellError::NotFound(path.to_path_buf()));
    }
    fsops::remove_any(path)?;
    Ok(())
}

fn move_back(from: &Path, to: &Path) -> Result<()> {
    if from.symlink_metadata().is_err() {
        return Err(ShellError::NotFound(from.to_path_buf()));
    }
    ensure_absent(to)?;
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fsops::move_path(from, to)?;
    Ok(())
}
