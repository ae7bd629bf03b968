//! Process-wide settings record.
//!
//! The session keeps one immutable snapshot of [`AppConfig`] and replaces it
//! wholesale on change; nothing mutates a live shared instance.

mod defaults;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::library::ReaderId;

use defaults::{
    MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH, clamp_max_recent_files, clamp_window_extent,
    default_max_recent_files, default_true, default_window_height, default_window_width,
};

/// Settings persisted to `config.toml`.
///
/// Config keys (TOML): `max_recent_files`, `default_reader_id`,
/// `auto_open_with_assigned_reader`, `show_notifications`, `theme`,
/// `recent_folders`, `window`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Rows shown per reader in the recent list; also scales the discovery cap.
    #[serde(default = "default_max_recent_files")]
    pub max_recent_files: usize,
    /// Mirror of the registry's default reader.
    #[serde(default)]
    pub default_reader_id: Option<ReaderId>,
    /// When false, opening always asks which reader to use.
    #[serde(default = "default_true")]
    pub auto_open_with_assigned_reader: bool,
    /// When false, informational status lines are not shown.
    #[serde(default = "default_true")]
    pub show_notifications: bool,
    #[serde(default)]
    pub theme: Theme,
    /// Folders scanned for recently touched PDFs.
    #[serde(default)]
    pub recent_folders: Vec<PathBuf>,
    #[serde(default)]
    pub window: WindowSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_recent_files: default_max_recent_files(),
            default_reader_id: None,
            auto_open_with_assigned_reader: true,
            show_notifications: true,
            theme: Theme::default(),
            recent_folders: Vec::new(),
            window: WindowSettings::default(),
        }
    }
}

impl AppConfig {
    /// Clamp out-of-range values loaded from disk.
    pub fn normalized(mut self) -> Self {
        self.max_recent_files = clamp_max_recent_files(self.max_recent_files);
        self.window = self.window.normalized();
        let mut seen = Vec::with_capacity(self.recent_folders.len());
        self.recent_folders.retain(|folder| {
            if seen.contains(folder) {
                return false;
            }
            seen.push(folder.clone());
            true
        });
        self
    }

    /// Upper bound on assignments a single discovery run may add.
    pub fn discovery_cap(&self, reader_count: usize) -> usize {
        self.max_recent_files.saturating_mul(reader_count)
    }
}

/// Colour theme of the launcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    #[serde(alias = "Light")]
    Light,
    #[serde(alias = "Dark")]
    Dark,
    #[serde(alias = "System")]
    System,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("Unknown theme: {other}")),
        }
    }
}

/// Window geometry remembered between launches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_window_width")]
    pub width: f64,
    #[serde(default = "default_window_height")]
    pub height: f64,
    #[serde(default = "default_true")]
    pub center_on_screen: bool,
    #[serde(default)]
    pub remember_position: bool,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            center_on_screen: true,
            remember_position: false,
            left: 0.0,
            top: 0.0,
        }
    }
}

impl WindowSettings {
    fn normalized(mut self) -> Self {
        self.width = clamp_window_extent(self.width, MIN_WINDOW_WIDTH);
        self.height = clamp_window_extent(self.height, MIN_WINDOW_HEIGHT);
        if !self.left.is_finite() {
            self.left = 0.0;
        }
        if !self.top.is_finite() {
            self.top = 0.0;
        }
        self
    }
}
