// error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy shared by every command handler.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("path {0} does not exist")]
    NotFound(PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("{0} is not a file")]
    NotAFile(PathBuf),

    #[error("{0} already exists")]
    AlreadyExists(PathBuf),

    #[error("{src} and {dst} are the same file")]
    SameFile { src: PathBuf, dst: PathBuf },

    #[error("permission denied for {path}: {reason}")]
    PermissionDenied { path: PathBuf, reason: &'static str },

    #[error("invalid regular expression: {0}")]
    MalformedPattern(#[from] regex::Error),

    #[error("nothing to undo")]
    EmptyLedger,

    #[error("unknown operation for undo: {0}")]
    UnknownOperationKind(String),

    #[error("history storage failed: {0}")]
    Persistence(#[source] std::io::Error),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of [`ShellError`], for callers that branch on the failure kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NotADirectory,
    NotAFile,
    AlreadyExists,
    SameFile,
    PermissionDenied,
    MalformedPattern,
    EmptyLedger,
    UnknownOperationKind,
    Persistence,
    Usage,
    Parse,
    Archive,
    Io,
}

impl ShellError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::NotFound(_) => ErrorKind::NotFound,
            ShellError::NotADirectory(_) => ErrorKind::NotADirectory,
            ShellError::NotAFile(_) => ErrorKind::NotAFile,
            ShellError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ShellError::SameFile { .. } => ErrorKind::SameFile,
            ShellError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ShellError::MalformedPattern(_) => ErrorKind::MalformedPattern,
            ShellError::EmptyLedger => ErrorKind::EmptyLedger,
            ShellError::UnknownOperationKind(_) => ErrorKind::UnknownOperationKind,
            ShellError::Persistence(_) => ErrorKind::Persistence,
            ShellError::Usage(_) => ErrorKind::Usage,
            ShellError::Parse(_) => ErrorKind::Parse,
            ShellError::Archive(_) => ErrorKind::Archive,
            ShellError::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<zip::result::ZipError> for ShellError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => ShellError::Io(e),
            other => ShellError::Archive(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
