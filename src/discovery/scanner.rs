use std::collections::HashSet;
use std::path::PathBuf;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::library::{is_pdf, path_key};

use super::{CandidateSource, touched_at};

/// Most recently touched files reported by one scan.
pub const SCAN_WINDOW: usize = 50;

/// Lists PDFs directly inside the configured recent folders, newest first.
#[derive(Debug, Clone, Default)]
pub struct RecentFolderScanner {
    folders: Vec<PathBuf>,
    window: usize,
}

impl RecentFolderScanner {
    pub fn new(folders: Vec<PathBuf>) -> Self {
        Self {
            folders,
            window: SCAN_WINDOW,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.recent_folders.clone())
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    fn collect(&self) -> Vec<(PathBuf, OffsetDateTime)> {
        let mut found = Vec::new();
        for folder in &self.folders {
            let entries = match std::fs::read_dir(folder) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(folder = %folder.display(), "Skipping unreadable folder: {err}");
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !is_pdf(&path) || !entry.file_type().is_ok_and(|kind| kind.is_file()) {
                    continue;
                }
                if let Some(stamp) = touched_at(&path) {
                    found.push((path, stamp));
                }
            }
        }
        found
    }
}

impl CandidateSource for RecentFolderScanner {
    fn scan_candidates(&self) -> Vec<PathBuf> {
        let mut found = self.collect();
        found.sort_by(|a, b| b.1.cmp(&a.1));
        let mut seen = HashSet::new();
        let candidates: Vec<PathBuf> = found
            .into_iter()
            .filter(|(path, _)| seen.insert(path_key(path)))
            .map(|(path, _)| path)
            .take(self.window)
            .collect();
        debug!(
            folders = self.folders.len(),
            candidates = candidates.len(),
            "Scanned recent folders"
        );
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, FileTimes};
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    fn touch(path: &Path, secs: u64) {
        std::fs::write(path, b"%PDF").unwrap();
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        let file = File::options().write(true).open(path).unwrap();
        file.set_times(FileTimes::new().set_modified(at).set_accessed(at))
            .unwrap();
    }

    #[test]
    fn lists_pdfs_newest_first_across_folders() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch(&first.path().join("old.pdf"), 1_000_000);
        touch(&second.path().join("new.PDF"), 3_000_000);
        touch(&first.path().join("mid.pdf"), 2_000_000);
        touch(&first.path().join("notes.txt"), 4_000_000);
        std::fs::create_dir(first.path().join("folder.pdf")).unwrap();

        let scanner = RecentFolderScanner::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(
            scanner.scan_candidates(),
            vec![
                second.path().join("new.PDF"),
                first.path().join("mid.pdf"),
                first.path().join("old.pdf"),
            ]
        );
    }

    #[test]
    fn window_bounds_the_result() {
        let dir = tempfile::tempdir().unwrap();
        for index in 0..5u64 {
            touch(&dir.path().join(format!("{index}.pdf")), 1_000_000 + index);
        }
        let scanner = RecentFolderScanner::new(vec![dir.path().to_path_buf()]).with_window(2);
        assert_eq!(
            scanner.scan_candidates(),
            vec![dir.path().join("4.pdf"), dir.path().join("3.pdf")]
        );
    }

    #[test]
    fn missing_folders_and_duplicates_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.pdf"), 1_000_000);
        let scanner = RecentFolderScanner::new(vec![
            dir.path().join("missing"),
            dir.path().to_path_buf(),
            dir.path().to_path_buf(),
        ]);
        assert_eq!(scanner.scan_candidates(), vec![dir.path().join("a.pdf")]);
    }
}
