use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod assignment;
pub mod detect;
mod errors;
mod events;
mod reader;
mod registry;
mod store;
pub(crate) mod timestamp;

pub use assignment::{Assignment, format_file_size};
pub use errors::LibraryError;
pub use events::{LibraryEvent, Observers, SubscriptionId};
pub use reader::Reader;
pub use registry::ReaderRegistry;
pub use store::AssignmentStore;

/// Identifier for a configured reader, stable across renames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReaderId(String);

impl ReaderId {
    /// Create a new unique reader identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Rehydrate a reader identifier from a stored string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ReaderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReaderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case-insensitive comparison key for a file path.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// True when both paths name the same file under case-insensitive matching.
pub fn same_path(a: &Path, b: &Path) -> bool {
    path_key(a) == path_key(b)
}

/// True for paths carrying a `.pdf` extension in any letter case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn paths_match_ignoring_case() {
        assert!(same_path(
            &PathBuf::from("C:/Docs/Report.PDF"),
            &PathBuf::from("c:/docs/report.pdf")
        ));
        assert!(!same_path(
            &PathBuf::from("C:/Docs/Report.pdf"),
            &PathBuf::from("C:/Docs/Report2.pdf")
        ));
    }

    #[test]
    fn pdf_extension_check_ignores_case() {
        assert!(is_pdf(Path::new("paper.PDF")));
        assert!(is_pdf(Path::new("/tmp/a.pdf")));
        assert!(!is_pdf(Path::new("notes.txt")));
        assert!(!is_pdf(Path::new("pdf")));
    }

    #[test]
    fn reader_ids_are_unique_and_serialize_as_strings() {
        let a = ReaderId::new();
        let b = ReaderId::new();
        assert_ne!(a, b);
        let json = serde_json::to_string(&ReaderId::from_string("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
