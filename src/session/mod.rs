//! The application session: one owner for readers, assignments and settings.
//!
//! Every user action goes through [`Session`]. Actions return a `Result` and
//! also leave a [`Status`] behind for the front-end to display; no I/O failure
//! escapes as a panic.

mod assignments;
mod errors;
mod readers;
mod settings;
mod status;


use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::discovery::CandidateSource;
use crate::launch::{Launcher, ProcessLauncher};
use crate::library::{
    Assignment, AssignmentStore, LibraryEvent, Reader, ReaderId, ReaderRegistry, SubscriptionId,
    detect,
};
use crate::persistence::{JsonFileStore, Persistence, PersistenceError};

pub use errors::SessionError;
pub use status::{Status, StatusTone};

pub(crate) use status::StatusMessage;

type ReaderDetection = Box<dyn Fn() -> Vec<Reader> + Send>;

/// Top-level state owned by one front-end.
pub struct Session {
    registry: ReaderRegistry,
    store: AssignmentStore,
    config: Arc<AppConfig>,
    persistence: Box<dyn Persistence>,
    launcher: Box<dyn Launcher>,
    /// Overrides the scanner built from `recent_folders`.
    candidates: Option<Box<dyn CandidateSource>>,
    detect_readers: ReaderDetection,
    selected_reader: Option<ReaderId>,
    search: String,
    status: Status,
}

impl Session {
    /// Create an empty session; call [`Session::load`] before use.
    pub fn new(persistence: Box<dyn Persistence>, launcher: Box<dyn Launcher>) -> Self {
        Self {
            registry: ReaderRegistry::new(),
            store: AssignmentStore::new(),
            config: Arc::new(AppConfig::default()),
            persistence,
            launcher,
            candidates: None,
            detect_readers: Box::new(Vec::new),
            selected_reader: None,
            search: String::new(),
            status: Status::default(),
        }
    }

    /// Session backed by the application directory, the process launcher and
    /// installed-reader detection, already loaded.
    pub fn open_default() -> Result<Self, SessionError> {
        let store = JsonFileStore::open_default()?;
        info!(dir = %store.dir().display(), "Using data directory");
        let mut session = Self::new(Box::new(store), Box::new(ProcessLauncher))
            .with_reader_detection(detect::detect_installed_readers);
        session.load();
        Ok(session)
    }

    pub fn with_candidate_source(mut self, source: Box<dyn CandidateSource>) -> Self {
        self.candidates = Some(source);
        self
    }

    /// Detection run when the loaded reader list is empty.
    pub fn with_reader_detection(
        mut self,
        detect: impl Fn() -> Vec<Reader> + Send + 'static,
    ) -> Self {
        self.detect_readers = Box::new(detect);
        self
    }

    /// Load settings, readers and assignments from persistence.
    ///
    /// An empty reader list triggers detection. Assignments for missing files
    /// are pruned. Save failures here are logged and reported in the status
    /// but never abort the load.
    pub fn load(&mut self) {
        self.config = Arc::new(self.persistence.load_config().normalized());

        self.registry.replace_all(self.persistence.load_readers());
        let mut warnings: Vec<String> = Vec::new();
        if self.registry.is_empty() {
            for reader in (self.detect_readers)() {
                self.registry.add(reader);
            }
            if !self.registry.is_empty() {
                info!(count = self.registry.len(), "Registered detected readers");
                if let Err(err) = self.persistence.save_readers(self.registry.readers()) {
                    warn!("Failed to save detected readers: {err}");
                    warnings.push(format!("Failed to save detected readers: {err}"));
                }
            }
        }
        if let Err(err) = self.sync_default_reader_setting() {
            warn!("Failed to save default reader setting: {err}");
            warnings.push(format!("Failed to save settings: {err}"));
        }

        self.store.replace_all(self.persistence.load_assignments());
        let pruned = self.store.prune_missing().len();
        if pruned > 0 {
            if let Err(err) = self.persistence.save_assignments(self.store.assignments()) {
                warn!("Failed to save pruned assignments: {err}");
                warnings.push(format!("Failed to save file list: {err}"));
            }
        }

        self.selected_reader = self.registry.default_reader().map(|reader| reader.id.clone());
        debug!(
            readers = self.registry.len(),
            assignments = self.store.len(),
            pruned,
            "Session loaded"
        );
        if let Some(warning) = warnings.pop() {
            self.set_status(warning, StatusTone::Error);
        } else if self.registry.is_empty() {
            self.set_status_message(StatusMessage::NoReadersConfigured);
        } else {
            self.set_status_message(StatusMessage::Loaded {
                readers: self.registry.len(),
                assignments: self.store.len(),
                pruned,
            });
        }
    }

    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    pub fn readers(&self) -> &[Reader] {
        self.registry.readers()
    }

    pub fn registry(&self) -> &ReaderRegistry {
        &self.registry
    }

    pub fn assignments(&self) -> &[Assignment] {
        self.store.assignments()
    }

    pub fn find_assignment(&self, path: &Path) -> Option<&Assignment> {
        self.store.find(path)
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Subscribe to reader registry changes.
    pub fn subscribe_readers(
        &mut self,
        callback: impl FnMut(&LibraryEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.registry.subscribe(callback)
    }

    /// Subscribe to assignment list changes.
    pub fn subscribe_assignments(
        &mut self,
        callback: impl FnMut(&LibraryEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id) || self.store.unsubscribe(id)
    }

    fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        let text = text.into();
        debug!(?tone, "{text}");
        self.status = Status { text, tone };
    }

    fn set_status_message(&mut self, message: StatusMessage) {
        let (text, tone) = message.into_text_and_tone();
        self.set_status(text, tone);
    }

    /// Record `error` as the status and hand it back for propagation.
    fn fail(&mut self, error: impl Into<SessionError>) -> SessionError {
        let error = error.into();
        warn!("{error}");
        self.set_status_message(StatusMessage::custom(error.to_string(), error.tone()));
        error
    }

    fn persist_readers(&mut self, error_prefix: &str) -> Result<(), SessionError> {
        self.persistence
            .save_readers(self.registry.readers())
            .map_err(|err| self.persist_failed(error_prefix, err))
    }

    fn persist_assignments(&mut self, error_prefix: &str) -> Result<(), SessionError> {
        self.persistence
            .save_assignments(self.store.assignments())
            .map_err(|err| self.persist_failed(error_prefix, err))
    }

    fn persist_config(&mut self, error_prefix: &str) -> Result<(), SessionError> {
        self.persistence
            .save_config(&self.config)
            .map_err(|err| self.persist_failed(error_prefix, err))
    }

    fn persist_failed(&mut self, error_prefix: &str, err: PersistenceError) -> SessionError {
        warn!("{error_prefix}: {err}");
        self.set_status(format!("{error_prefix}: {err}"), StatusTone::Error);
        SessionError::PersistenceFailure(err)
    }

    /// Keep `default_reader_id` in the settings equal to the registry's default.
    fn sync_default_reader_setting(&mut self) -> Result<(), PersistenceError> {
        let current = self.registry.default_reader().map(|reader| reader.id.clone());
        if self.config.default_reader_id == current {
            return Ok(());
        }
        let mut next = (*self.config).clone();
        next.default_reader_id = current;
        self.config = Arc::new(next);
        self.persistence.save_config(&self.config)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("readers", &self.registry.len())
            .field("assignments", &self.store.len())
            .field("selected_reader", &self.selected_reader)
            .field("search", &self.search)
            .field("status", &self.status)
            .finish()
    }
}
