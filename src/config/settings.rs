//! Resolved runtime settings.
//!
//! [`LogConfig`] is the on-disk form; [`Settings`] is the validated,
//! resolved form every request reads through an atomically swappable
//! handle. Swapping takes effect for requests that start after the swap.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::LogConfig;
use crate::config::validation::{single_digit, validate_config, ValidationError};
use crate::logger::LogLevel;
use crate::style::{Style, Tint};

/// Shared handle: settings are swapped atomically on reload.
pub type SharedSettings = Arc<ArcSwap<Settings>>;

/// Resolved style and mode settings for request logging.
#[derive(Debug, Clone)]
pub struct Settings {
    level_styles: HashMap<LogLevel, Style>,
    status_styles: HashMap<u8, Style>,

    /// Process-wide immediate mode; per-request overrides exist on the
    /// logger itself.
    pub immediate: bool,
}

impl Settings {
    /// Resolve a config into runtime settings, validating it first.
    pub fn from_config(config: &LogConfig) -> Result<Self, Vec<ValidationError>> {
        validate_config(config)?;

        let mut level_styles = HashMap::new();
        for (name, style) in &config.levels {
            // both parses were checked by validation
            if let (Ok(level), Ok(style)) = (name.parse(), style.parse()) {
                level_styles.insert(level, style);
            }
        }

        let mut status_styles = HashMap::new();
        for (key, style) in &config.status {
            if let (Some(digit), Ok(style)) = (single_digit(key), style.parse()) {
                status_styles.insert(digit, style);
            }
        }

        Ok(Self {
            level_styles,
            status_styles,
            immediate: config.immediate,
        })
    }

    /// Style for a level; levels without an entry print unstyled.
    pub fn level_style(&self, level: LogLevel) -> Style {
        self.level_styles.get(&level).copied().unwrap_or_default()
    }

    /// Style for a status code, by its leading digit; unmapped classes use
    /// red.
    pub fn status_style(&self, status: u16) -> Style {
        let digit = (status / 100) as u8;
        self.status_styles
            .get(&digit)
            .copied()
            .unwrap_or(Style::tinted(Tint::Red))
    }

    /// Wrap in the process-wide swap handle.
    pub fn into_shared(self) -> SharedSettings {
        Arc::new(ArcSwap::from_pointee(self))
    }
}

impl Default for Settings {
    fn default() -> Self {
        let mut level_styles = HashMap::new();
        level_styles.insert(LogLevel::Debug, Style::tinted(Tint::Cyan));
        level_styles.insert(LogLevel::Log, Style::default());
        level_styles.insert(LogLevel::Info, Style::tinted(Tint::Grey));
        level_styles.insert(LogLevel::Error, Style::tinted(Tint::Red));

        let mut status_styles = HashMap::new();
        status_styles.insert(2, Style::tinted(Tint::Green));
        status_styles.insert(3, Style::tinted(Tint::White));
        status_styles.insert(4, Style::tinted(Tint::Yellow));

        Self {
            level_styles,
            status_styles,
            immediate: false,
        }
    }
}
