use std::sync::Arc;

use crate::config::AppConfig;

use super::{Session, SessionError, StatusMessage};

impl Session {
    /// Replace the settings snapshot with an edited copy and save it.
    ///
    /// The default reader is owned by the registry, so edits to
    /// `default_reader_id` made here are discarded.
    pub fn update_config(
        &mut self,
        edit: impl FnOnce(&mut AppConfig),
    ) -> Result<Arc<AppConfig>, SessionError> {
        let mut next = (*self.config).clone();
        edit(&mut next);
        next.default_reader_id = self.config.default_reader_id.clone();
        self.config = Arc::new(next.normalized());
        self.persist_config("Failed to save settings")?;
        self.set_status_message(StatusMessage::SettingsSaved);
        Ok(Arc::clone(&self.config))
    }
}
