//! Import of the older PascalCase JSON files (`lectores.json`,
//! `asignaciones.json`, `config.json`).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tracing::warn;

use crate::config::{AppConfig, Theme, WindowSettings};
use crate::library::{Assignment, Reader, ReaderId, timestamp};

use super::PersistenceError;

pub const LEGACY_READERS_FILE_NAME: &str = "lectores.json";
pub const LEGACY_ASSIGNMENTS_FILE_NAME: &str = "asignaciones.json";
pub const LEGACY_CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyReader {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    executable_path: PathBuf,
    #[serde(default)]
    icon_path: Option<PathBuf>,
    #[serde(default)]
    is_default: bool,
}

impl From<LegacyReader> for Reader {
    fn from(legacy: LegacyReader) -> Self {
        let mut reader = match legacy.name.filter(|name| !name.trim().is_empty()) {
            Some(name) => Reader::new(name, legacy.executable_path),
            None => Reader::from_executable(legacy.executable_path),
        };
        if let Some(id) = legacy.id.filter(|id| !id.is_empty()) {
            reader.id = ReaderId::from_string(id);
        }
        reader.icon_path = legacy.icon_path.filter(|path| !path.as_os_str().is_empty());
        reader.is_default = legacy.is_default;
        reader
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyAssignment {
    file_path: PathBuf,
    #[serde(default)]
    reader_id: Option<String>,
    #[serde(default)]
    last_opened: Option<String>,
}

impl LegacyAssignment {
    fn into_assignment(self, fallback_time: OffsetDateTime) -> Assignment {
        let last_opened = self
            .last_opened
            .as_deref()
            .and_then(timestamp::parse)
            .unwrap_or(fallback_time);
        let mut assignment = Assignment::new(self.file_path, last_opened);
        assignment.reader_id = self
            .reader_id
            .filter(|id| !id.is_empty())
            .map(ReaderId::from_string);
        assignment
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyConfig {
    max_recent_files: Option<usize>,
    default_reader_id: Option<String>,
    auto_open_with_assigned_reader: Option<bool>,
    show_notifications: Option<bool>,
    theme: Option<String>,
    #[serde(default)]
    recent_folders: Vec<PathBuf>,
    window_settings: Option<LegacyWindowSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyWindowSettings {
    width: Option<f64>,
    height: Option<f64>,
    center_on_screen: Option<bool>,
    remember_position: Option<bool>,
    left: Option<f64>,
    top: Option<f64>,
}

impl From<LegacyConfig> for AppConfig {
    fn from(legacy: LegacyConfig) -> Self {
        let defaults = AppConfig::default();
        let theme = legacy
            .theme
            .as_deref()
            .and_then(|raw| match raw.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(err) => {
                    warn!("Ignoring legacy theme: {err}");
                    None
                }
            })
            .unwrap_or_default();
        AppConfig {
            max_recent_files: legacy.max_recent_files.unwrap_or(defaults.max_recent_files),
            default_reader_id: legacy
                .default_reader_id
                .filter(|id| !id.is_empty())
                .map(ReaderId::from_string),
            auto_open_with_assigned_reader: legacy
                .auto_open_with_assigned_reader
                .unwrap_or(defaults.auto_open_with_assigned_reader),
            show_notifications: legacy
                .show_notifications
                .unwrap_or(defaults.show_notifications),
            theme,
            recent_folders: legacy.recent_folders,
            window: legacy
                .window_settings
                .map(WindowSettings::from)
                .unwrap_or(defaults.window),
        }
        .normalized()
    }
}

impl From<LegacyWindowSettings> for WindowSettings {
    fn from(legacy: LegacyWindowSettings) -> Self {
        let defaults = WindowSettings::default();
        WindowSettings {
            width: legacy.width.unwrap_or(defaults.width),
            height: legacy.height.unwrap_or(defaults.height),
            center_on_screen: legacy.center_on_screen.unwrap_or(defaults.center_on_screen),
            remember_position: legacy
                .remember_position
                .unwrap_or(defaults.remember_position),
            left: legacy.left.unwrap_or(defaults.left),
            top: legacy.top.unwrap_or(defaults.top),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let bytes = std::fs::read(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    serde_json::from_slice(bytes).map_err(|source| PersistenceError::ParseJson {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn load_legacy_readers(path: &Path) -> Result<Vec<Reader>, PersistenceError> {
    let legacy: Vec<LegacyReader> = read_json(path)?;
    Ok(legacy.into_iter().map(Reader::from).collect())
}

/// Entries without a readable timestamp take `fallback_time`.
pub(super) fn load_legacy_assignments(
    path: &Path,
    fallback_time: OffsetDateTime,
) -> Result<Vec<Assignment>, PersistenceError> {
    let legacy: Vec<LegacyAssignment> = read_json(path)?;
    Ok(legacy
        .into_iter()
        .map(|entry| entry.into_assignment(fallback_time))
        .collect())
}

pub(super) fn load_legacy_config(path: &Path) -> Result<AppConfig, PersistenceError> {
    let legacy: LegacyConfig = read_json(path)?;
    Ok(AppConfig::from(legacy))
}

/// Move a migrated legacy file to `<name>.json.bak`, replacing an older backup.
pub(super) fn backup_legacy_file(path: &Path) -> Result<PathBuf, PersistenceError> {
    let backup_path = path.with_extension("json.bak");
    if backup_path.exists() {
        std::fs::remove_file(&backup_path).map_err(|source| PersistenceError::BackupLegacy {
            path: path.to_path_buf(),
            backup_path: backup_path.clone(),
            source,
        })?;
    }
    std::fs::rename(path, &backup_path).map_err(|source| PersistenceError::BackupLegacy {
        path: path.to_path_buf(),
        backup_path: backup_path.clone(),
        source,
    })?;
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn reads_pascal_case_readers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEGACY_READERS_FILE_NAME);
        std::fs::write(
            &path,
            r#"[
                {"Id": "r-1", "Name": "Adobe", "ExecutablePath": "C:\\Adobe\\AcroRd32.exe", "IconPath": null, "IsDefault": true},
                {"Id": "", "Name": "", "ExecutablePath": "C:\\Tools\\Sumatra.exe", "IsDefault": false}
            ]"#,
        )
        .unwrap();

        let readers = load_legacy_readers(&path).unwrap();
        assert_eq!(readers.len(), 2);
        assert_eq!(readers[0].id, ReaderId::from_string("r-1"));
        assert_eq!(readers[0].name, "Adobe");
        assert!(readers[0].is_default);
        assert!(!readers[1].id.as_str().is_empty());
        assert!(!readers[1].is_default);
    }

    #[test]
    fn reads_assignments_with_net_style_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEGACY_ASSIGNMENTS_FILE_NAME);
        std::fs::write(
            &path,
            "\u{feff}".to_string()
                + r#"[
                {"FilePath": "C:\\Docs\\a.pdf", "ReaderId": "r-1", "LastOpened": "2024-03-01T09:15:00.1234567+01:00", "FileName": "a.pdf", "FileSize": 10},
                {"FilePath": "C:\\Docs\\b.pdf", "ReaderId": null, "LastOpened": "garbage"}
            ]"#,
        )
        .unwrap();
        let fallback = datetime!(2020-01-01 0:00 UTC);

        let assignments = load_legacy_assignments(&path, fallback).unwrap();
        assert_eq!(assignments[0].reader_id, Some(ReaderId::from_string("r-1")));
        assert_eq!(
            assignments[0].last_opened,
            datetime!(2024-03-01 09:15:00.1234567 +01:00)
        );
        assert_eq!(assignments[1].reader_id, None);
        assert_eq!(assignments[1].last_opened, fallback);
    }

    #[test]
    fn legacy_config_fills_defaults_and_parses_theme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEGACY_CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"MaxRecentFiles": 25, "Theme": "Dark", "DefaultReaderId": "r-1",
                "WindowSettings": {"Width": 1200, "RememberPosition": true}}"#,
        )
        .unwrap();

        let config = load_legacy_config(&path).unwrap();
        assert_eq!(config.max_recent_files, 25);
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.default_reader_id, Some(ReaderId::from_string("r-1")));
        assert!(config.show_notifications);
        assert_eq!(config.window.width, 1200.0);
        assert_eq!(config.window.height, 700.0);
        assert!(config.window.remember_position);
    }

    #[test]
    fn backup_replaces_previous_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LEGACY_CONFIG_FILE_NAME);
        std::fs::write(dir.path().join("config.json.bak"), b"stale").unwrap();
        std::fs::write(&path, b"{}").unwrap();

        let backup = backup_legacy_file(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(std::fs::read(backup).unwrap(), b"{}");
    }
}
