use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ReaderId;

/// An installed application able to open PDF files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reader {
    #[serde(default)]
    pub id: ReaderId,
    pub name: String,
    pub executable_path: PathBuf,
    #[serde(default)]
    pub icon_path: Option<PathBuf>,
    #[serde(default)]
    pub is_default: bool,
}

impl Reader {
    /// Create a non-default reader with a fresh identifier.
    pub fn new(name: impl Into<String>, executable_path: impl Into<PathBuf>) -> Self {
        Self {
            id: ReaderId::new(),
            name: name.into(),
            executable_path: executable_path.into(),
            icon_path: None,
            is_default: false,
        }
    }

    /// Build a reader named after the executable's file stem.
    pub fn from_executable(executable_path: impl Into<PathBuf>) -> Self {
        let executable_path = executable_path.into();
        let name = display_name_for(&executable_path);
        Self::new(name, executable_path)
    }

    /// True when the executable is still present on disk.
    pub fn is_available(&self) -> bool {
        self.executable_path.is_file()
    }
}

fn display_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "Reader".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_executable_stem() {
        let reader = Reader::from_executable("/opt/viewers/SumatraPDF.exe");
        assert_eq!(reader.name, "SumatraPDF");
        assert!(!reader.is_default);
        assert_eq!(Reader::from_executable("/").name, "Reader");
    }

    #[test]
    fn availability_tracks_executable_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("viewer");
        let reader = Reader::new("Viewer", &exe);
        assert!(!reader.is_available());
        std::fs::write(&exe, b"").unwrap();
        assert!(reader.is_available());
    }
}
