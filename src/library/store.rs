use std::collections::HashSet;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use tracing::{debug, info};

use super::{
    Assignment, LibraryError, LibraryEvent, Observers, ReaderId, SubscriptionId, path_key,
};

/// Ordered assignment list, newest first, unique by case-insensitive path.
///
/// Like the registry, the store never touches disk except to check that files
/// still exist.
#[derive(Debug, Default)]
pub struct AssignmentStore {
    assignments: Vec<Assignment>,
    observers: Observers,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted entries, keeping the first of any duplicate paths.
    pub fn from_assignments(assignments: Vec<Assignment>) -> Self {
        let mut store = Self::new();
        store.replace_all(assignments);
        store
    }

    /// Swap in a freshly loaded list, keeping subscribers. No events are emitted.
    pub fn replace_all(&mut self, assignments: Vec<Assignment>) {
        let mut seen = HashSet::with_capacity(assignments.len());
        let before = assignments.len();
        let assignments: Vec<Assignment> = assignments
            .into_iter()
            .filter(|entry| seen.insert(path_key(&entry.file_path)))
            .collect();
        if assignments.len() != before {
            debug!(
                dropped = before - assignments.len(),
                "Dropped duplicate assignments while loading"
            );
        }
        self.assignments = assignments;
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }

    pub fn find(&self, path: &Path) -> Option<&Assignment> {
        self.position(path).map(|index| &self.assignments[index])
    }

    fn position(&self, path: &Path) -> Option<usize> {
        let key = path_key(path);
        self.assignments
            .iter()
            .position(|entry| path_key(&entry.file_path) == key)
    }

    /// Insert a new assignment at the front of the list.
    pub fn upsert(&mut self, assignment: Assignment) -> Result<(), LibraryError> {
        if self.contains_path(&assignment.file_path) {
            return Err(LibraryError::DuplicateKey {
                path: assignment.file_path,
            });
        }
        let path = assignment.file_path.clone();
        self.assignments.insert(0, assignment);
        self.observers.emit(LibraryEvent::AssignmentAdded(path));
        Ok(())
    }

    /// Insert a batch at the front, preserving its order. Paths already
    /// tracked are skipped. Returns how many were inserted.
    pub fn merge_front(&mut self, batch: Vec<Assignment>) -> usize {
        let mut keys: HashSet<String> = self
            .assignments
            .iter()
            .map(|entry| path_key(&entry.file_path))
            .collect();
        let fresh: Vec<Assignment> = batch
            .into_iter()
            .filter(|entry| keys.insert(path_key(&entry.file_path)))
            .collect();
        let inserted = fresh.len();
        let added: Vec<PathBuf> = fresh.iter().map(|entry| entry.file_path.clone()).collect();
        self.assignments.splice(0..0, fresh);
        for path in added {
            self.observers.emit(LibraryEvent::AssignmentAdded(path));
        }
        inserted
    }

    /// Remove the assignment for `path`; absent paths are a no-op.
    pub fn remove(&mut self, path: &Path) -> Option<Assignment> {
        let index = self.position(path)?;
        let removed = self.assignments.remove(index);
        self.observers
            .emit(LibraryEvent::AssignmentRemoved(removed.file_path.clone()));
        Some(removed)
    }

    /// Drop assignments whose files no longer exist. Returns the removed entries.
    pub fn prune_missing(&mut self) -> Vec<Assignment> {
        let (kept, removed): (Vec<_>, Vec<_>) = std::mem::take(&mut self.assignments)
            .into_iter()
            .partition(Assignment::exists);
        self.assignments = kept;
        if !removed.is_empty() {
            info!(count = removed.len(), "Pruned assignments for missing files");
            self.observers
                .emit(LibraryEvent::AssignmentsPruned(removed.len()));
        }
        removed
    }

    /// Record an open: bump the timestamp and, when given, pin the reader.
    pub fn mark_opened(
        &mut self,
        path: &Path,
        reader_id: Option<ReaderId>,
        opened_at: OffsetDateTime,
    ) -> Result<(), LibraryError> {
        let index = self
            .position(path)
            .ok_or_else(|| LibraryError::AssignmentNotFound(path.to_path_buf()))?;
        let entry = &mut self.assignments[index];
        entry.last_opened = opened_at;
        if let Some(reader_id) = reader_id {
            entry.reader_id = Some(reader_id);
        }
        let path = entry.file_path.clone();
        self.observers.emit(LibraryEvent::AssignmentUpdated(path));
        Ok(())
    }

    /// Replace the reader for one assignment; `None` returns it to the default reader.
    pub fn set_reader(
        &mut self,
        path: &Path,
        reader_id: Option<ReaderId>,
    ) -> Result<(), LibraryError> {
        let index = self
            .position(path)
            .ok_or_else(|| LibraryError::AssignmentNotFound(path.to_path_buf()))?;
        let entry = &mut self.assignments[index];
        entry.reader_id = reader_id;
        let path = entry.file_path.clone();
        self.observers.emit(LibraryEvent::AssignmentUpdated(path));
        Ok(())
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&LibraryEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}
