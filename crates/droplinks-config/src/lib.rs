//! DropLinks configuration system
//!
//! This crate provides centralized configuration management for DropLinks,
//! loading settings from `droplinks.toml` with environment variables as
//! overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for DropLinks
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DropConfig {
    /// Snapshot storage settings
    pub storage: StorageConfig,
    /// Pointer gesture thresholds
    pub gestures: GestureConfig,
    /// Mirror-file synchronization settings
    pub sync: SyncConfig,
    /// Link metadata resolution settings
    pub metadata: MetadataConfig,
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the local snapshot store (default: `~/.droplinks`)
    pub data_dir: Option<PathBuf>,
}

/// Pointer gesture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Hold duration before a stationary press opens the link editor (ms)
    pub long_press_ms: u64,
    /// Movement beyond this distance turns a press into a drag (px)
    pub drag_threshold_px: f32,
}

/// Mirror-file synchronization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between host-driven sync checks; 0 disables auto-sync
    pub interval_secs: u64,
    /// Write the mirror file on every save once a path is granted
    pub auto_mirror: bool,
}

/// Link metadata resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Fetch page titles in the background after a link is added
    pub fetch_titles: bool,
    /// Favicon service prefix; the host is appended as a query parameter
    pub favicon_base: String,
    /// Timeout for title fetches in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: None }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 800,
            drag_threshold_px: 5.0,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            // Manual sync only unless the host opts in.
            interval_secs: 0,
            auto_mirror: true,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            fetch_titles: true,
            favicon_base: "https://www.google.com/s2/favicons".to_string(),
            fetch_timeout_secs: 15,
        }
    }
}

impl DropConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the droplinks.toml configuration file
    ///
    /// # Returns
    /// * `Ok(DropConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from the default location (droplinks.toml in the
    /// current directory) or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("droplinks.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// This allows for temporary overrides without modifying the config file.
    pub fn merge_with_env(&mut self) {
        if let Ok(dir) = std::env::var("DROPLINKS_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(val) = std::env::var("DROPLINKS_LONG_PRESS_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.gestures.long_press_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("DROPLINKS_DRAG_THRESHOLD") {
            if let Ok(px) = val.parse::<f32>() {
                self.gestures.drag_threshold_px = px;
            }
        }

        if let Ok(val) = std::env::var("DROPLINKS_SYNC_INTERVAL") {
            if let Ok(secs) = val.parse::<u64>() {
                self.sync.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("DROPLINKS_AUTO_MIRROR") {
            self.sync.auto_mirror = val == "1" || val.eq_ignore_ascii_case("true");
        }

        if let Ok(val) = std::env::var("DROPLINKS_FETCH_TITLES") {
            self.metadata.fetch_titles = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Ok(base) = std::env::var("DROPLINKS_FAVICON_BASE") {
            self.metadata.favicon_base = base;
        }
        if let Ok(val) = std::env::var("DROPLINKS_FETCH_TIMEOUT") {
            if let Ok(secs) = val.parse::<u64>() {
                self.metadata.fetch_timeout_secs = secs;
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// This is the recommended way to load configuration:
    /// 1. Load from droplinks.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
