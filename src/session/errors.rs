use std::path::PathBuf;

use thiserror::Error;

use crate::launch::LaunchError;
use crate::library::LibraryError;
use crate::persistence::PersistenceError;
use crate::resolve::ResolveError;

use super::StatusTone;

/// Failure of a session action. The session also records it as its status.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// A save failed; the in-memory change is kept.
    #[error("Changes were not saved: {0}")]
    PersistenceFailure(#[from] PersistenceError),
    #[error("Executable not found: {0}")]
    ExecutableNotFound(PathBuf),
    #[error("Not a PDF file: {0}")]
    NotPdf(PathBuf),
    #[error("Reader name cannot be empty")]
    EmptyReaderName,
}

impl SessionError {
    pub(crate) fn tone(&self) -> StatusTone {
        match self {
            SessionError::Library(LibraryError::DuplicateKey { .. })
            | SessionError::Library(LibraryError::GuardedOperation)
            | SessionError::NotPdf(_)
            | SessionError::EmptyReaderName => StatusTone::Warning,
            _ => StatusTone::Error,
        }
    }
}
