use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Thresholds and filters shared read-only by every file of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// Minutes a file must have rested before it may be renamed.
    pub required_wait_time: f64,
    /// Minutes after which a file is considered someone else's business.
    pub max_wait_time: f64,
    pub allowed_extensions: Vec<String>,
    pub ignored_folder_names: Vec<String>,
    pub move_to_folder: bool,
    /// Files are only touched below a folder whose name starts with this.
    pub complete_marker: String,
    /// Flat folder whose lone files get their own subfolder after renaming.
    pub downloads_folder_name: String,
    pub mediainfo_path: String,
    pub mediainfo_timeout_secs: u64,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            required_wait_time: 20.0,
            max_wait_time: 60.0,
            allowed_extensions: vec![".mkv".to_string(), ".mp4".to_string()],
            ignored_folder_names: Vec::new(),
            move_to_folder: true,
            complete_marker: "complete".to_string(),
            downloads_folder_name: "downloads".to_string(),
            mediainfo_path: "mediainfo".to_string(),
            mediainfo_timeout_secs: 60,
        }
    }
}

impl RenameConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|e| e == extension)
    }

    pub fn is_ignored_folder(&self, name: &str) -> bool {
        self.ignored_folder_names.iter().any(|n| n == name)
    }
}
