//! Configuration management for the engine factory
//!
//! This module provides runtime configuration loading from JSON files, so
//! engine arguments, native log verbosity and identity strings can change
//! without recompilation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::LogLevel;

/// Complete factory configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Arguments handed to the native engine at initialisation
    #[serde(default)]
    pub engine_args: Vec<String>,
    /// Native log verbosity applied right after initialisation
    #[serde(default)]
    pub log_level: LogLevel,
    /// Application identity forwarded to the engine, if any
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
    #[serde(default)]
    pub events: EventsConfig,
}

/// Application identity strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub app_name: String,
    /// Name used for HTTP requests, e.g. `"MyApp/1.0"`
    #[serde(default)]
    pub http_app_name: Option<String>,
}

/// Per-player event fan-out settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Buffer of the broadcast channel behind `MediaPlayer::subscribe`
    pub broadcast_capacity: usize,
    /// Number of listener failures kept for inspection
    pub failure_history: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 128,
            failure_history: 32,
        }
    }
}

impl FactoryConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file is missing or
    /// its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file("assets/mediaplayer.json")
    }
}
