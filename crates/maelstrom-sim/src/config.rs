//! Harness configuration.
//!
//! Controls logging and how scenario runs are reported. Loaded from
//! `maelstrom.toml`; a missing or broken file falls back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::filter::Directive;

/// Configuration file name.
pub const CONFIG_FILE: &str = "maelstrom.toml";

/// Log directive used when the config gives none or an invalid one.
pub const DEFAULT_LOG_FILTER: &str = "maelstrom=info";

/// Harness configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Pretty-print the JSON report
    pub pretty_output: bool,
    /// Abort the run on the first rejected impact or leap
    pub stop_on_error: bool,
    /// Include final entity states in the report
    pub include_entities: bool,
    /// Extra log directive added on top of `RUST_LOG`
    pub log_filter: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            pretty_output: true,
            stop_on_error: true,
            include_entities: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl SimConfig {
    /// Load configuration from the working directory.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Resets malformed fields to their defaults.
    /// Returns the names of the fields that were reset.
    pub fn validate(&mut self) -> Vec<&'static str> {
        let mut reset = Vec::new();
        if self.log_directive().is_none() {
            self.log_filter = DEFAULT_LOG_FILTER.to_string();
            reset.push("log_filter");
        }
        reset
    }

    /// Parses `log_filter` as a tracing directive.
    pub fn log_directive(&self) -> Option<Directive> {
        let filter = self.log_filter.trim();
        if filter.is_empty() {
            return None;
        }
        filter.parse().ok()
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }
}
