//! Discovery of recently touched PDFs and their merge into the assignment store.

mod scanner;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::SystemTime;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::library::{Assignment, AssignmentStore, path_key};

pub use scanner::{RecentFolderScanner, SCAN_WINDOW};

/// Supplies candidate PDF paths, newest first, bounded to a fixed window.
pub trait CandidateSource: Send + Sync {
    fn scan_candidates(&self) -> Vec<PathBuf>;
}

/// Summary of one merge run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    /// Candidates already tracked, or repeated within the batch.
    pub already_tracked: usize,
    /// Candidates whose timestamps could not be read.
    pub unreadable: usize,
}

/// Run `source` on a worker thread and wait for its result.
pub fn scan_on_worker(source: &dyn CandidateSource) -> Vec<PathBuf> {
    thread::scope(|scope| {
        let handle = scope.spawn(|| source.scan_candidates());
        handle.join().unwrap_or_else(|_| {
            warn!("Candidate scan thread panicked");
            Vec::new()
        })
    })
}

/// Merge new candidates into `store`.
///
/// Candidates are visited in order; tracked paths (case-insensitive) are
/// skipped, and at most `max_new` new assignments are built with no reader
/// and `last_opened` set by `touched_at`. The batch is inserted at the front
/// of the store in candidate order.
pub fn merge_candidates(
    store: &mut AssignmentStore,
    candidates: &[PathBuf],
    max_new: usize,
    touched_at: impl Fn(&Path) -> Option<OffsetDateTime>,
) -> MergeStats {
    let mut stats = MergeStats::default();
    let mut batch: Vec<Assignment> = Vec::new();
    let mut batch_keys: Vec<String> = Vec::new();
    for candidate in candidates {
        if batch.len() >= max_new {
            break;
        }
        let key = path_key(candidate);
        if store.contains_path(candidate) || batch_keys.contains(&key) {
            stats.already_tracked += 1;
            continue;
        }
        let Some(timestamp) = touched_at(candidate) else {
            debug!(path = %candidate.display(), "Skipping candidate without timestamps");
            stats.unreadable += 1;
            continue;
        };
        batch_keys.push(key);
        batch.push(Assignment::new(candidate.clone(), timestamp));
    }
    stats.inserted = store.merge_front(batch);
    stats
}

/// The later of a file's last-access and last-write times.
pub fn touched_at(path: &Path) -> Option<OffsetDateTime> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok();
    let accessed = metadata.accessed().ok();
    let latest: SystemTime = match (modified, accessed) {
        (Some(modified), Some(accessed)) => modified.max(accessed),
        (Some(one), None) | (None, Some(one)) => one,
        (None, None) => return None,
    };
    Some(OffsetDateTime::from(latest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn fixed(_: &Path) -> Option<OffsetDateTime> {
        Some(datetime!(2024-04-01 08:00 UTC))
    }

    fn paths(store: &AssignmentStore) -> Vec<PathBuf> {
        store
            .assignments()
            .iter()
            .map(|entry| entry.file_path.clone())
            .collect()
    }

    #[test]
    fn empty_candidate_list_inserts_nothing() {
        let mut store = AssignmentStore::new();
        let stats = merge_candidates(&mut store, &[], 10, fixed);
        assert_eq!(stats, MergeStats::default());
        assert!(store.is_empty());
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let mut store = AssignmentStore::new();
        let candidates = vec![
            PathBuf::from("/docs/a.pdf"),
            PathBuf::from("/docs/b.pdf"),
            PathBuf::from("/DOCS/A.PDF"),
        ];
        let first = merge_candidates(&mut store, &candidates, 10, fixed);
        assert_eq!(first.inserted, 2);
        assert_eq!(first.already_tracked, 1);
        let second = merge_candidates(&mut store, &candidates, 10, fixed);
        assert_eq!(second.inserted, 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn new_entries_are_unassigned_and_keep_candidate_order_at_front() {
        let mut store = AssignmentStore::new();
        store
            .upsert(Assignment::new("/docs/old.pdf", datetime!(2023-01-01 0:00 UTC)))
            .unwrap();
        let candidates = vec![PathBuf::from("/docs/newest.pdf"), PathBuf::from("/docs/newer.pdf")];
        merge_candidates(&mut store, &candidates, 10, fixed);
        assert_eq!(
            paths(&store),
            vec![
                PathBuf::from("/docs/newest.pdf"),
                PathBuf::from("/docs/newer.pdf"),
                PathBuf::from("/docs/old.pdf"),
            ]
        );
        assert!(store.assignments()[0].reader_id.is_none());
        assert_eq!(store.assignments()[0].last_opened, datetime!(2024-04-01 08:00 UTC));
    }

    #[test]
    fn cap_counts_only_qualifying_candidates() {
        let mut store = AssignmentStore::new();
        store
            .upsert(Assignment::new("/docs/a.pdf", datetime!(2023-01-01 0:00 UTC)))
            .unwrap();
        let candidates: Vec<PathBuf> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| PathBuf::from(format!("/docs/{name}.pdf")))
            .collect();
        let stats = merge_candidates(&mut store, &candidates, 2, fixed);
        assert_eq!(stats.inserted, 2);
        assert!(store.contains_path(Path::new("/docs/b.pdf")));
        assert!(store.contains_path(Path::new("/docs/c.pdf")));
        assert!(!store.contains_path(Path::new("/docs/d.pdf")));

        let stats = merge_candidates(&mut store, &candidates, 0, fixed);
        assert_eq!(stats.inserted, 0);
    }

    #[test]
    fn candidates_without_timestamps_are_skipped() {
        let mut store = AssignmentStore::new();
        let stats = merge_candidates(
            &mut store,
            &[PathBuf::from("/missing/a.pdf")],
            5,
            |_| None,
        );
        assert_eq!(stats.unreadable, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn touched_at_prefers_later_of_access_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let written = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        let read = written + std::time::Duration::from_secs(3600);
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_times(
            std::fs::FileTimes::new()
                .set_modified(written)
                .set_accessed(read),
        )
        .unwrap();
        drop(file);

        assert_eq!(touched_at(&path), Some(OffsetDateTime::from(read)));
        assert_eq!(touched_at(&dir.path().join("nope.pdf")), None);
    }

    struct Fixed(Vec<PathBuf>);

    impl CandidateSource for Fixed {
        fn scan_candidates(&self) -> Vec<PathBuf> {
            self.0.clone()
        }
    }

    #[test]
    fn worker_scan_returns_source_output() {
        let source = Fixed(vec![PathBuf::from("/docs/a.pdf")]);
        assert_eq!(scan_on_worker(&source), vec![PathBuf::from("/docs/a.pdf")]);
    }
}
