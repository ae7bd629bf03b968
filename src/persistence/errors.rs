use std::path::PathBuf;

use thiserror::Error;

use crate::app_dirs::AppDirError;

/// Errors that may occur while reading or writing the persisted lists and settings.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Failed to create the data directory.
    #[error("Unable to create data directory {path}: {source}")]
    CreateDir {
        /// Directory path that failed to create.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to read a data file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to write a data file.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// A JSON list could not be parsed.
    #[error("Invalid data at {path}: {source}")]
    ParseJson {
        /// JSON file path.
        path: PathBuf,
        /// JSON parse error.
        source: serde_json::Error,
    },
    /// The settings file could not be parsed.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    #[error("Failed to serialize {path}: {source}")]
    SerializeJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// Failed to rename a migrated legacy file out of the way.
    #[error("Failed to back up legacy file {path} to {backup_path}: {source}")]
    BackupLegacy {
        path: PathBuf,
        backup_path: PathBuf,
        source: std::io::Error,
    },
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
}

impl From<AppDirError> for PersistenceError {
    fn from(error: AppDirError) -> Self {
        match error {
            AppDirError::NoBaseDir => PersistenceError::NoConfigDir,
            AppDirError::CreateDir { path, source } => PersistenceError::CreateDir { path, source },
        }
    }
}
