use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::de::Error as SerdeDeError;
use tracing::{info, warn};

use crate::app_dirs;
use crate::config::AppConfig;
use crate::library::{Assignment, Reader, ReaderId, timestamp};

use super::atomic::atomic_write;
use super::legacy::{
    LEGACY_ASSIGNMENTS_FILE_NAME, LEGACY_CONFIG_FILE_NAME, LEGACY_READERS_FILE_NAME,
    backup_legacy_file, load_legacy_assignments, load_legacy_config, load_legacy_readers,
};
use super::{
    ASSIGNMENTS_FILE_NAME, CONFIG_FILE_NAME, Persistence, PersistenceError, READERS_FILE_NAME,
};

/// Stores readers and assignments as JSON and settings as TOML in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir` as the data directory; it is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use the application directory, creating it if needed.
    pub fn open_default() -> Result<Self, PersistenceError> {
        Ok(Self::new(app_dirs::app_root_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn readers_path(&self) -> PathBuf {
        self.dir.join(READERS_FILE_NAME)
    }

    pub fn assignments_path(&self) -> PathBuf {
        self.dir.join(ASSIGNMENTS_FILE_NAME)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// Read the reader list, importing `lectores.json` when no current file exists.
    pub fn try_load_readers(&self) -> Result<Vec<Reader>, PersistenceError> {
        let path = self.readers_path();
        if path.exists() {
            let (readers, minted) = read_readers(&path)?;
            if minted > 0 {
                info!(minted, path = %path.display(), "Assigned ids to readers stored without one");
                if let Err(err) = self.save_readers(&readers) {
                    warn!("Failed to save reader ids: {err}");
                }
            }
            return Ok(readers);
        }
        let legacy_path = self.dir.join(LEGACY_READERS_FILE_NAME);
        if !legacy_path.exists() {
            return Ok(Vec::new());
        }
        let readers = load_legacy_readers(&legacy_path)?;
        info!(count = readers.len(), path = %legacy_path.display(), "Imported legacy reader list");
        if let Err(err) = self.save_readers(&readers) {
            warn!("Failed to save imported reader list: {err}");
        }
        Ok(readers)
    }

    /// Read the assignment list, importing `asignaciones.json` when no current file exists.
    pub fn try_load_assignments(&self) -> Result<Vec<Assignment>, PersistenceError> {
        let path = self.assignments_path();
        if path.exists() {
            return read_json_list(&path);
        }
        let legacy_path = self.dir.join(LEGACY_ASSIGNMENTS_FILE_NAME);
        if !legacy_path.exists() {
            return Ok(Vec::new());
        }
        let assignments = load_legacy_assignments(&legacy_path, timestamp::now())?;
        info!(
            count = assignments.len(),
            path = %legacy_path.display(),
            "Imported legacy assignment list"
        );
        if let Err(err) = self.save_assignments(&assignments) {
            warn!("Failed to save imported assignment list: {err}");
        }
        Ok(assignments)
    }

    /// Read settings, migrating a legacy `config.json` into `config.toml`.
    pub fn try_load_config(&self) -> Result<AppConfig, PersistenceError> {
        let path = self.config_path();
        if path.exists() {
            return load_settings_from(&path);
        }
        let legacy_path = self.dir.join(LEGACY_CONFIG_FILE_NAME);
        if !legacy_path.exists() {
            return Ok(AppConfig::default());
        }
        let config = load_legacy_config(&legacy_path)?;
        self.save_config(&config)?;
        let backup = backup_legacy_file(&legacy_path)?;
        info!(backup = %backup.display(), "Migrated legacy config to TOML");
        Ok(config)
    }
}

impl Persistence for JsonFileStore {
    fn load_readers(&self) -> Vec<Reader> {
        self.try_load_readers().unwrap_or_else(|err| {
            warn!("Using empty reader list: {err}");
            Vec::new()
        })
    }

    fn save_readers(&self, readers: &[Reader]) -> Result<(), PersistenceError> {
        write_json(&self.readers_path(), readers)
    }

    fn load_assignments(&self) -> Vec<Assignment> {
        self.try_load_assignments().unwrap_or_else(|err| {
            warn!("Using empty assignment list: {err}");
            Vec::new()
        })
    }

    fn save_assignments(&self, assignments: &[Assignment]) -> Result<(), PersistenceError> {
        write_json(&self.assignments_path(), assignments)
    }

    fn load_config(&self) -> AppConfig {
        self.try_load_config().unwrap_or_else(|err| {
            warn!("Using default settings: {err}");
            AppConfig::default()
        })
    }

    fn save_config(&self, config: &AppConfig) -> Result<(), PersistenceError> {
        let path = self.config_path();
        let data = toml::to_string_pretty(config).map_err(|source| {
            PersistenceError::SerializeToml {
                path: path.clone(),
                source,
            }
        })?;
        atomic_write(&path, data.as_bytes())
    }
}

fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PersistenceError> {
    let bytes = std::fs::read(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&bytes).map_err(|source| PersistenceError::ParseJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Read `readers.json`, giving id-less entries a fresh id. Returns how many were minted.
fn read_readers(path: &Path) -> Result<(Vec<Reader>, usize), PersistenceError> {
    let entries: Vec<serde_json::Value> = read_json_list(path)?;
    let mut readers = Vec::with_capacity(entries.len());
    let mut minted = 0;
    for entry in entries {
        let has_id = entry
            .get("id")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|id| !id.is_empty());
        let mut reader: Reader =
            serde_json::from_value(entry).map_err(|source| PersistenceError::ParseJson {
                path: path.to_path_buf(),
                source,
            })?;
        if !has_id {
            reader.id = ReaderId::new();
            minted += 1;
        }
        readers.push(reader);
    }
    Ok((readers, minted))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let data =
        serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::SerializeJson {
            path: path.to_path_buf(),
            source,
        })?;
    atomic_write(path, &data)
}

fn load_settings_from(path: &Path) -> Result<AppConfig, PersistenceError> {
    let bytes = std::fs::read(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| PersistenceError::ParseToml {
        path: path.to_path_buf(),
        source: SerdeDeError::custom(source),
    })?;
    toml::from_str::<AppConfig>(&text)
        .map(AppConfig::normalized)
        .map_err(|source| PersistenceError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use time::macros::datetime;

    #[test]
    fn lists_and_config_survive_a_save_load_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let mut reader = Reader::new("Viewer", "/usr/bin/viewer");
        reader.is_default = true;
        let assignment = Assignment::new("/docs/a.pdf", datetime!(2024-02-03 04:05:06 UTC))
            .with_reader(reader.id.clone());
        let mut config = AppConfig::default();
        config.theme = Theme::Dark;
        config.default_reader_id = Some(reader.id.clone());

        store.save_readers(std::slice::from_ref(&reader)).unwrap();
        store.save_assignments(std::slice::from_ref(&assignment)).unwrap();
        store.save_config(&config).unwrap();

        assert_eq!(store.load_readers(), vec![reader]);
        assert_eq!(store.load_assignments(), vec![assignment]);
        assert_eq!(store.load_config(), config);
    }

    #[test]
    fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent"));
        assert!(store.load_readers().is_empty());
        assert!(store.load_assignments().is_empty());
        assert_eq!(store.load_config(), AppConfig::default());
    }

    #[test]
    fn corrupt_files_are_fail_soft() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.readers_path(), b"{not json").unwrap();
        std::fs::write(store.assignments_path(), b"[{\"file_path\": 3}]").unwrap();
        std::fs::write(store.config_path(), b"max_recent_files = \"many\"").unwrap();

        assert!(matches!(
            store.try_load_readers(),
            Err(PersistenceError::ParseJson { .. })
        ));
        assert!(store.load_readers().is_empty());
        assert!(store.load_assignments().is_empty());
        assert!(matches!(
            store.try_load_config(),
            Err(PersistenceError::ParseToml { .. })
        ));
        assert_eq!(store.load_config(), AppConfig::default());
    }

    #[test]
    fn readers_without_ids_keep_the_id_they_get_on_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(
            store.readers_path(),
            br#"[{"name": "Viewer", "executable_path": "/usr/bin/viewer", "is_default": true},
                {"id": "", "name": "Other", "executable_path": "/usr/bin/other"}]"#,
        )
        .unwrap();

        let first = store.load_readers();
        assert!(first.iter().all(|reader| !reader.id.as_str().is_empty()));
        assert_ne!(first[0].id, first[1].id);
        assert_eq!(store.load_readers(), first);
    }

    #[test]
    fn config_values_are_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.config_path(), b"max_recent_files = 0\n").unwrap();
        assert_eq!(store.load_config().max_recent_files, 1);
    }

    #[test]
    fn legacy_lists_are_imported_and_resaved() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(
            dir.path().join(LEGACY_READERS_FILE_NAME),
            r#"[{"Id": "r-1", "Name": "Edge", "ExecutablePath": "C:\\Edge\\msedge.exe", "IsDefault": true}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(LEGACY_ASSIGNMENTS_FILE_NAME),
            r#"[{"FilePath": "C:\\Docs\\a.pdf", "ReaderId": "r-1", "LastOpened": "2024-01-05T10:00:00"}]"#,
        )
        .unwrap();

        let readers = store.load_readers();
        let assignments = store.load_assignments();
        assert_eq!(readers[0].id, ReaderId::from_string("r-1"));
        assert_eq!(assignments[0].last_opened, datetime!(2024-01-05 10:00 UTC));
        assert!(store.readers_path().is_file());
        assert!(store.assignments_path().is_file());
        assert_eq!(store.load_readers(), readers);
        assert_eq!(store.load_assignments(), assignments);
    }

    #[test]
    fn legacy_config_is_migrated_and_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let legacy_path = dir.path().join(LEGACY_CONFIG_FILE_NAME);
        std::fs::write(&legacy_path, r#"{"MaxRecentFiles": 30, "ShowNotifications": false}"#)
            .unwrap();

        let config = store.load_config();
        assert_eq!(config.max_recent_files, 30);
        assert!(!config.show_notifications);
        assert!(store.config_path().is_file());
        assert!(!legacy_path.exists());
        assert!(dir.path().join("config.json.bak").is_file());
        assert_eq!(store.load_config(), config);
    }
}
