//! Configuration schema definitions.
//!
//! This module defines the on-disk configuration for request logging.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for request logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level name → style string (e.g. "cyan", "bold grey").
    pub levels: HashMap<String, String>,

    /// Status-class leading digit → style string. Classes without an entry
    /// render in red.
    pub status: HashMap<String, String>,

    /// Print lines synchronously instead of buffering until flush.
    pub immediate: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        let mut levels = HashMap::new();
        levels.insert("debug".to_string(), "cyan".to_string());
        levels.insert("log".to_string(), "default".to_string());
        levels.insert("info".to_string(), "grey".to_string());
        levels.insert("error".to_string(), "red".to_string());

        let mut status = HashMap::new();
        status.insert("2".to_string(), "green".to_string());
        status.insert("3".to_string(), "white".to_string());
        status.insert("4".to_string(), "yellow".to_string());

        Self {
            levels,
            status,
            immediate: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_level() {
        let config = LogConfig::default();
        for level in ["debug", "log", "info", "error"] {
            assert!(config.levels.contains_key(level));
        }
        assert!(!config.immediate);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: LogConfig = toml::from_str("immediate = true").unwrap();
        assert!(config.immediate);
        assert_eq!(config.levels.get("debug").map(String::as_str), Some("cyan"));
        assert_eq!(config.status.get("2").map(String::as_str), Some("green"));
    }
}
