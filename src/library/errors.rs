use std::path::PathBuf;

use thiserror::Error;

use super::ReaderId;

/// Precondition failures raised by the reader registry and assignment store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LibraryError {
    /// An assignment for this path is already tracked.
    #[error("{path} is already in the list")]
    DuplicateKey {
        /// Path that collided, as supplied by the caller.
        path: PathBuf,
    },
    /// Removing the reader would leave the registry empty.
    #[error("At least one reader must remain configured")]
    GuardedOperation,
    /// No reader carries this identifier.
    #[error("Unknown reader {0}")]
    ReaderNotFound(ReaderId),
    /// No assignment is tracked for this path.
    #[error("{0} is not in the list")]
    AssignmentNotFound(PathBuf),
}
