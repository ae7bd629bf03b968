use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::discovery::{self, MergeStats, RecentFolderScanner};
use crate::launch::LaunchError;
use crate::library::{Assignment, LibraryError, Reader, ReaderId, is_pdf, timestamp};
use crate::resolve::{self, PromptOutcome, ReaderPrompt, Resolved};
use crate::view::{self, ViewQuery};

use super::{Session, SessionError, StatusMessage, StatusTone};

/// Outcome of adding files by hand.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddFilesSummary {
    pub added: Vec<PathBuf>,
    pub already_tracked: Vec<PathBuf>,
    /// Paths that are not existing PDF files.
    pub rejected: Vec<PathBuf>,
}

impl Session {
    /// Rows for the current reader selection and search text.
    pub fn visible(&self) -> Vec<&Assignment> {
        let query = ViewQuery::new(self.selected_reader.clone(), self.config.max_recent_files)
            .with_search(self.search.clone());
        let default_reader = self.registry.default_reader().map(|reader| &reader.id);
        view::filter_assignments(self.store.assignments(), &query, default_reader)
    }

    pub fn selected_reader(&self) -> Option<&ReaderId> {
        self.selected_reader.as_ref()
    }

    /// Show files for `reader`, or for every reader when `None`.
    pub fn select_reader(&mut self, reader: Option<ReaderId>) -> Result<(), SessionError> {
        if let Some(id) = &reader {
            if self.registry.find(id).is_none() {
                return Err(self.fail(LibraryError::ReaderNotFound(id.clone())));
            }
        }
        self.selected_reader = reader;
        Ok(())
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Discover recently touched PDFs and merge them into the list.
    ///
    /// The scan runs on a worker thread; the session waits for it before
    /// touching the store. At most `max_recent_files × readers` new files are
    /// added per run.
    pub fn scan(&mut self) -> Result<MergeStats, SessionError> {
        self.set_status("Scanning for recent PDF files", StatusTone::Busy);
        let candidates = match &self.candidates {
            Some(source) => discovery::scan_on_worker(source.as_ref()),
            None => discovery::scan_on_worker(&RecentFolderScanner::from_config(&self.config)),
        };
        let cap = self.config.discovery_cap(self.registry.len());
        let stats =
            discovery::merge_candidates(&mut self.store, &candidates, cap, discovery::touched_at);
        debug!(
            candidates = candidates.len(),
            inserted = stats.inserted,
            already_tracked = stats.already_tracked,
            "Discovery merge finished"
        );
        if stats.inserted > 0 {
            self.persist_assignments("Failed to save file list after scan")?;
        }
        self.set_status_message(StatusMessage::ScanFinished {
            added: stats.inserted,
        });
        Ok(stats)
    }

    /// Track PDF files picked by the user; new entries go to the top of the list.
    pub fn add_files<I, P>(&mut self, paths: I) -> Result<AddFilesSummary, SessionError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut summary = AddFilesSummary::default();
        let now = timestamp::now();
        for path in paths {
            let path = path.into();
            if !is_pdf(&path) || !path.is_file() {
                summary.rejected.push(path);
                continue;
            }
            match self.store.upsert(Assignment::new(path.clone(), now)) {
                Ok(()) => summary.added.push(path),
                Err(LibraryError::DuplicateKey { path }) => summary.already_tracked.push(path),
                Err(err) => return Err(self.fail(err)),
            }
        }
        if !summary.added.is_empty() {
            self.persist_assignments("Failed to save file list after adding files")?;
        }
        info!(
            added = summary.added.len(),
            skipped = summary.already_tracked.len() + summary.rejected.len(),
            "Added files"
        );
        self.set_status_message(StatusMessage::FilesAdded {
            added: summary.added.len(),
            skipped: summary.already_tracked.len() + summary.rejected.len(),
        });
        Ok(summary)
    }

    /// Stop tracking `path`. Untracked paths are a no-op.
    pub fn remove_assignment(&mut self, path: &Path) -> Result<Option<Assignment>, SessionError> {
        let Some(removed) = self.store.remove(path) else {
            self.set_status_message(StatusMessage::NotTracked {
                file: display_name(path),
            });
            return Ok(None);
        };
        self.persist_assignments("Failed to save file list after removal")?;
        self.set_status_message(StatusMessage::AssignmentRemoved {
            file: removed.file_name(),
        });
        Ok(Some(removed))
    }

    /// Pin `path` to `reader`, or return it to the default reader with `None`.
    pub fn change_reader(
        &mut self,
        path: &Path,
        reader: Option<ReaderId>,
    ) -> Result<(), SessionError> {
        let reader_name = match &reader {
            Some(id) => match self.registry.find(id) {
                Some(found) => Some(found.name.clone()),
                None => return Err(self.fail(LibraryError::ReaderNotFound(id.clone()))),
            },
            None => None,
        };
        self.store
            .set_reader(path, reader)
            .map_err(|err| self.fail(err))?;
        self.persist_assignments("Failed to save file list after changing reader")?;
        self.set_status_message(StatusMessage::ReaderChanged {
            file: display_name(path),
            reader: reader_name,
        });
        Ok(())
    }

    /// Open a tracked file, asking `prompt` when no reader can be chosen automatically.
    ///
    /// The store is only updated after the launcher succeeds; a failed launch
    /// leaves the assignment untouched.
    pub fn open(
        &mut self,
        path: &Path,
        prompt: &mut dyn ReaderPrompt,
    ) -> Result<Resolved, SessionError> {
        let assignment = match self.store.find(path) {
            Some(found) => found.clone(),
            None => return Err(self.fail(LibraryError::AssignmentNotFound(path.to_path_buf()))),
        };
        let resolved = resolve::resolve(
            &assignment,
            &self.registry,
            self.config.auto_open_with_assigned_reader,
            prompt,
        )
        .map_err(|err| self.fail(err))?;
        self.launch(&assignment, resolved)
    }

    /// Open a tracked file with an explicit reader, storing the choice.
    pub fn open_with(&mut self, path: &Path, reader: &ReaderId) -> Result<Resolved, SessionError> {
        let mut prompt = Fixed(reader.clone());
        let assignment = match self.store.find(path) {
            Some(found) => found.clone(),
            None => return Err(self.fail(LibraryError::AssignmentNotFound(path.to_path_buf()))),
        };
        if self.registry.find(reader).is_none() {
            return Err(self.fail(LibraryError::ReaderNotFound(reader.clone())));
        }
        let resolved = resolve::resolve(&assignment, &self.registry, false, &mut prompt)
            .map_err(|err| self.fail(err))?;
        self.launch(&assignment, resolved)
    }

    /// Track `path` if needed, then open it.
    pub fn open_path(
        &mut self,
        path: &Path,
        prompt: &mut dyn ReaderPrompt,
    ) -> Result<Resolved, SessionError> {
        self.track(path)?;
        self.open(path, prompt)
    }

    /// Start tracking `path` unless it already is.
    pub fn track(&mut self, path: &Path) -> Result<(), SessionError> {
        if self.store.contains_path(path) {
            return Ok(());
        }
        if !path.is_file() {
            return Err(self.fail(LaunchError::FileMissing {
                path: path.to_path_buf(),
            }));
        }
        if !is_pdf(path) {
            return Err(self.fail(SessionError::NotPdf(path.to_path_buf())));
        }
        self.add_files([path.to_path_buf()])?;
        Ok(())
    }

    /// Show a tracked or untracked file in the platform file manager.
    pub fn reveal(&mut self, path: &Path) -> Result<(), SessionError> {
        self.launcher.reveal(path).map_err(|err| self.fail(err))
    }

    fn launch(&mut self, assignment: &Assignment, resolved: Resolved) -> Result<Resolved, SessionError> {
        let reader = resolved.reader();
        self.launcher
            .open(&assignment.file_path, reader)
            .map_err(|err| self.fail(err))?;
        self.store
            .mark_opened(
                &assignment.file_path,
                resolved.reader_to_store(),
                timestamp::now(),
            )
            .map_err(|err| self.fail(err))?;
        self.persist_assignments("Failed to save file list after opening")?;
        self.set_status_message(StatusMessage::Opened {
            file: assignment.file_name(),
            reader: resolved.reader().name.clone(),
        });
        Ok(resolved)
    }
}

/// Prompt stand-in that always picks one reader and remembers it.
struct Fixed(ReaderId);

impl ReaderPrompt for Fixed {
    fn choose_reader(
        &mut self,
        _assignment: &Assignment,
        _readers: &[Reader],
        _preselected: Option<&ReaderId>,
    ) -> PromptOutcome {
        PromptOutcome::Selected {
            reader_id: self.0.clone(),
            remember: true,
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
