use std::path::PathBuf;

use tracing::info;

use crate::library::{LibraryError, Reader, ReaderId, same_path};

use super::{Session, SessionError, StatusMessage};

impl Session {
    /// Register a reader executable. The name defaults to the file stem.
    pub fn add_reader(
        &mut self,
        executable: impl Into<PathBuf>,
        name: Option<String>,
    ) -> Result<ReaderId, SessionError> {
        let executable = executable.into();
        if !executable.is_file() {
            return Err(self.fail(SessionError::ExecutableNotFound(executable)));
        }
        if self
            .registry
            .readers()
            .iter()
            .any(|reader| same_path(&reader.executable_path, &executable))
        {
            return Err(self.fail(LibraryError::DuplicateKey { path: executable }));
        }
        let mut reader = Reader::from_executable(executable);
        if let Some(name) = name.map(|name| name.trim().to_string()).filter(|name| !name.is_empty()) {
            reader.name = name;
        }
        let name = reader.name.clone();
        let id = self.registry.add(reader);
        info!(reader = %name, id = %id, "Reader registered");
        self.persist_readers("Failed to save readers after adding a reader")?;
        self.sync_default_setting_or_report()?;
        if self.selected_reader.is_none() {
            self.selected_reader = Some(id.clone());
        }
        self.set_status_message(StatusMessage::ReaderAdded { name });
        Ok(id)
    }

    /// Remove a reader. The last remaining reader cannot be removed.
    ///
    /// Assignments pinned to the removed reader keep their stale id and will
    /// prompt on next open.
    pub fn remove_reader(&mut self, id: &ReaderId) -> Result<Reader, SessionError> {
        let removed = self.registry.remove(id).map_err(|err| self.fail(err))?;
        if self.selected_reader.as_ref() == Some(&removed.id) {
            self.selected_reader = self.registry.default_reader().map(|reader| reader.id.clone());
        }
        self.persist_readers("Failed to save readers after removing a reader")?;
        self.sync_default_setting_or_report()?;
        self.set_status_message(StatusMessage::ReaderRemoved {
            name: removed.name.clone(),
        });
        Ok(removed)
    }

    pub fn set_default_reader(&mut self, id: &ReaderId) -> Result<(), SessionError> {
        self.registry.set_default(id).map_err(|err| self.fail(err))?;
        self.persist_readers("Failed to save readers after changing the default")?;
        self.sync_default_setting_or_report()?;
        let name = self
            .registry
            .find(id)
            .map(|reader| reader.name.clone())
            .unwrap_or_default();
        self.set_status_message(StatusMessage::DefaultReaderSet { name });
        Ok(())
    }

    pub fn rename_reader(&mut self, id: &ReaderId, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.fail(SessionError::EmptyReaderName));
        }
        self.registry
            .rename(id, name)
            .map_err(|err| self.fail(err))?;
        self.persist_readers("Failed to save readers after renaming")?;
        self.set_status_message(StatusMessage::ReaderRenamed {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Look a reader up by id or case-insensitive name.
    pub fn find_reader(&self, needle: &str) -> Option<&Reader> {
        self.registry.find_by_id_or_name(needle)
    }

    fn sync_default_setting_or_report(&mut self) -> Result<(), SessionError> {
        self.sync_default_reader_setting()
            .map_err(|err| self.persist_failed("Failed to save default reader setting", err))
    }
}
