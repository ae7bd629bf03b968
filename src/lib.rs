//! Remembers which PDF reader opens which PDF file.
/// Application data directory resolution.
pub mod app_dirs;
/// Settings record and its defaults.
pub mod config;
/// Discovery of recently touched PDFs.
pub mod discovery;
/// Opening files in readers and the file manager.
pub mod launch;
/// Readers, assignments and their collections.
pub mod library;
/// Tracing subscriber setup.
pub mod logging;
/// Durable storage of readers, assignments and settings.
pub mod persistence;
/// Reader choice when opening a file.
pub mod resolve;
/// Top-level application session.
pub mod session;
/// Filtered, ordered view of the assignment list.
pub mod view;
