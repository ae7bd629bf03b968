//! Durable storage for the reader list, the assignment list and settings.
//!
//! Loads never fail: a missing or unreadable file yields an empty list or the
//! default settings, and the problem is logged. Saves report errors so the
//! session can surface them.

mod atomic;
mod errors;
mod file_store;
mod legacy;

pub use errors::PersistenceError;
pub use file_store::JsonFileStore;
pub use legacy::{LEGACY_ASSIGNMENTS_FILE_NAME, LEGACY_CONFIG_FILE_NAME, LEGACY_READERS_FILE_NAME};

use crate::config::AppConfig;
use crate::library::{Assignment, Reader};

/// File holding the reader list.
pub const READERS_FILE_NAME: &str = "readers.json";
/// File holding the assignment list.
pub const ASSIGNMENTS_FILE_NAME: &str = "assignments.json";
/// File holding the settings record.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Load/save contract used by the session.
pub trait Persistence: Send {
    fn load_readers(&self) -> Vec<Reader>;
    fn save_readers(&self, readers: &[Reader]) -> Result<(), PersistenceError>;
    fn load_assignments(&self) -> Vec<Assignment>;
    fn save_assignments(&self, assignments: &[Assignment]) -> Result<(), PersistenceError>;
    fn load_config(&self) -> AppConfig;
    fn save_config(&self, config: &AppConfig) -> Result<(), PersistenceError>;
}
