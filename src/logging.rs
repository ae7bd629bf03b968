//! Tracing setup for the launcher.
//!
//! Every run gets its own `pdfman_<timestamp>.log` under `<app dir>/logs`;
//! the terminal only sees warnings unless `RUST_LOG` is set. Older runs are
//! pruned so the folder holds at most [`MAX_LOG_FILES`] logs.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, filter::LevelFilter, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

/// Log files kept in the logs folder, this run's included.
pub const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "pdfman";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Reasons tracing could not be set up.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Cannot locate the logs folder: {0}")]
    Dirs(#[from] AppDirError),
    /// This run's log file could not be created.
    #[error("Cannot create {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Old logs could not be listed or deleted.
    #[error("Cannot prune old logs at {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot build a log file name: {0}")]
    FileName(time::error::Format),
    /// Another subscriber was installed first.
    #[error("Tracing is already configured: {0}")]
    Install(tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber. Later calls do nothing.
///
/// The caller decides what to do on failure; the CLI just reports it and
/// carries on without logs.
pub fn init() -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let log_dir = app_dirs::logs_dir()?;
    let log_path = create_run_log(&log_dir, now_local_or_utc())?;
    let file_name = log_path
        .file_name()
        .map(|name| name.to_owned())
        .unwrap_or_default();
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(&log_dir, file_name));

    let timer = build_timer();
    let subscriber = Registry::default()
        .with(build_env_filter())
        .with(
            fmt::layer()
                .with_timer(timer.clone())
                .with_writer(std::io::stderr)
                .with_filter(stderr_level()),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::Install)?;
    let _ = LOG_GUARD.set(guard);

    match prune_old_logs(&log_dir, MAX_LOG_FILES) {
        Ok(removed) => tracing::debug!(removed, log = %log_path.display(), "Logging ready"),
        Err(err) => tracing::warn!("{err}"),
    }
    Ok(())
}

/// Create an empty log file named after `started`, returning its path.
fn create_run_log(dir: &Path, started: OffsetDateTime) -> Result<PathBuf, LoggingError> {
    let path = dir.join(log_file_name(started)?);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::LogFile {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Delete all but the `keep` newest `.log` files in `dir`; returns how many went.
fn prune_old_logs(dir: &Path, keep: usize) -> Result<usize, LoggingError> {
    let prune_error = |source| LoggingError::Prune {
        path: dir.to_path_buf(),
        source,
    };
    let mut logs: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).map_err(prune_error)?.flatten() {
        let path = entry.path();
        let is_log = path.extension().is_some_and(|ext| ext == "log");
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if is_log && metadata.is_file() {
            logs.push((metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH), path));
        }
    }

    logs.sort_by(|a, b| b.0.cmp(&a.0));
    let stale = logs.split_off(keep.min(logs.len()));
    for (_, path) in &stale {
        fs::remove_file(path).map_err(|source| LoggingError::Prune {
            path: path.clone(),
            source,
        })?;
    }
    Ok(stale.len())
}

fn log_file_name(started: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = started.format(STAMP).map_err(LoggingError::FileName)?;
    Ok(format!("{LOG_FILE_PREFIX}_{stamp}.log"))
}

fn build_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const LINE_STAMP: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, LINE_STAMP.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Warnings only on the terminal, unless `RUST_LOG` asks for more.
fn stderr_level() -> LevelFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    }
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs::File, time::Duration};
    use tempfile::tempdir;

    #[test]
    fn run_log_is_named_after_start_time() {
        let dir = tempdir().unwrap();
        let started = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let path = create_run_log(dir.path(), started).unwrap();
        assert_eq!(path, dir.path().join("pdfman_2023-11-14_22-13-20.log"));
        assert!(path.is_file());
    }

    #[test]
    fn pruning_keeps_newest_logs_and_ignores_other_files() {
        let dir = tempdir().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        for idx in 0..12u64 {
            let path = dir.path().join(format!("pdfman_{idx}.log"));
            let file = File::create(&path).unwrap();
            file.set_modified(base + Duration::from_secs(idx)).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        assert_eq!(prune_old_logs(dir.path(), 10).unwrap(), 2);

        assert!(!dir.path().join("pdfman_0.log").exists());
        assert!(!dir.path().join("pdfman_1.log").exists());
        assert!(dir.path().join("pdfman_2.log").exists());
        assert!(dir.path().join("pdfman_11.log").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(prune_old_logs(dir.path(), 10).unwrap(), 0);
    }
}
