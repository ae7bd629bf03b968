use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{ReaderId, timestamp};

/// A tracked PDF file, optionally pinned to a reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub file_path: PathBuf,
    /// `None` means the default reader handles this file.
    #[serde(default)]
    pub reader_id: Option<ReaderId>,
    #[serde(with = "timestamp")]
    pub last_opened: OffsetDateTime,
}

impl Assignment {
    /// Create an unassigned entry.
    pub fn new(file_path: impl Into<PathBuf>, last_opened: OffsetDateTime) -> Self {
        Self {
            file_path: file_path.into(),
            reader_id: None,
            last_opened,
        }
    }

    pub fn with_reader(mut self, reader_id: ReaderId) -> Self {
        self.reader_id = Some(reader_id);
        self
    }

    /// Base name of the tracked path.
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.to_string_lossy().into_owned())
    }

    pub fn exists(&self) -> bool {
        self.file_path.is_file()
    }

    /// File size in bytes, or `None` when the file cannot be read.
    pub fn size(&self) -> Option<u64> {
        std::fs::metadata(&self.file_path)
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }

    /// Human-readable size, empty when the file is gone.
    pub fn size_label(&self) -> String {
        self.size().map(format_file_size).unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Format a byte count with B/KB/MB/GB units and at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rendered = format!("{value:.2}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn sizes_use_binary_units_and_trim_zeros() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn derived_attributes_follow_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Report.pdf");
        let assignment = Assignment::new(&path, datetime!(2024-01-01 0:00 UTC));
        assert_eq!(assignment.file_name(), "Report.pdf");
        assert!(!assignment.exists());
        assert_eq!(assignment.size(), None);
        assert_eq!(assignment.size_label(), "");

        std::fs::write(&path, vec![0u8; 2048]).unwrap();
        assert!(assignment.exists());
        assert_eq!(assignment.size(), Some(2048));
        assert_eq!(assignment.size_label(), "2 KB");
    }

    #[test]
    fn serializes_timestamp_as_rfc3339() {
        let assignment = Assignment::new("/docs/a.pdf", datetime!(2024-05-02 10:30:00 UTC))
            .with_reader(ReaderId::from_string("r1"));
        let json = serde_json::to_value(&assignment).unwrap();
        assert_eq!(json["last_opened"], "2024-05-02T10:30:00Z");
        assert_eq!(json["reader_id"], "r1");
        let back: Assignment = serde_json::from_value(json).unwrap();
        assert_eq!(back, assignment);
    }
}
