//! Handing files to external programs.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::info;

use crate::library::Reader;

/// Failures while starting a reader or the file manager.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The PDF is gone.
    #[error("File not found: {path}")]
    FileMissing { path: PathBuf },
    /// The reader's executable is gone.
    #[error("Reader {name} is unavailable: {path} does not exist")]
    ReaderUnavailable { name: String, path: PathBuf },
    /// The process could not be started.
    #[error("Failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file manager refused to show the file.
    #[error("Could not reveal {path}: {message}")]
    Reveal { path: PathBuf, message: String },
}

/// Opens files in readers and reveals them in the file manager.
pub trait Launcher: Send {
    fn open(&self, file: &Path, reader: &Reader) -> Result<(), LaunchError>;
    fn reveal(&self, file: &Path) -> Result<(), LaunchError>;
}

/// Spawns the reader executable as a detached child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn open(&self, file: &Path, reader: &Reader) -> Result<(), LaunchError> {
        if !file.is_file() {
            return Err(LaunchError::FileMissing {
                path: file.to_path_buf(),
            });
        }
        if !reader.is_available() {
            return Err(LaunchError::ReaderUnavailable {
                name: reader.name.clone(),
                path: reader.executable_path.clone(),
            });
        }
        let mut command = Command::new(&reader.executable_path);
        command
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = reader
            .executable_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            command.current_dir(dir);
        }
        command.spawn().map_err(|source| LaunchError::Spawn {
            path: reader.executable_path.clone(),
            source,
        })?;
        info!(reader = %reader.name, path = %file.display(), "Opened file");
        Ok(())
    }

    fn reveal(&self, file: &Path) -> Result<(), LaunchError> {
        reveal_in_file_explorer(file)
    }
}

/// Show `path` selected in the platform file manager.
pub fn reveal_in_file_explorer(path: &Path) -> Result<(), LaunchError> {
    if !path.exists() {
        return Err(LaunchError::FileMissing {
            path: path.to_path_buf(),
        });
    }
    #[cfg(target_os = "windows")]
    {
        // explorer.exe reports a failure exit code even when it succeeds.
        let quoted = format!("/select,\"{}\"", path.display());
        Command::new("explorer.exe")
            .arg(quoted)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                path: PathBuf::from("explorer.exe"),
                source,
            })?;
        Ok(())
    }
    #[cfg(target_os = "macos")]
    {
        let status = Command::new("open")
            .arg("-R")
            .arg(path)
            .status()
            .map_err(|source| LaunchError::Spawn {
                path: PathBuf::from("open"),
                source,
            })?;
        if status.success() {
            return Ok(());
        }
        Err(LaunchError::Reveal {
            path: path.to_path_buf(),
            message: "Finder exited unsuccessfully".into(),
        })
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let parent = path.parent().ok_or_else(|| LaunchError::Reveal {
            path: path.to_path_buf(),
            message: "Unable to resolve parent directory".into(),
        })?;
        open::that(parent).map_err(|err| LaunchError::Reveal {
            path: path.to_path_buf(),
            message: format!("Could not open folder {}: {err}", parent.display()),
        })
    }
}
