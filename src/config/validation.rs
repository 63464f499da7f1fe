//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check level names against the level taxonomy
//! - Check style strings against the palette
//! - Check status keys are single leading digits
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: LogConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system, including on reload

use thiserror::Error;

use crate::config::schema::LogConfig;
use crate::logger::LogLevel;
use crate::style::Style;

/// One finding from semantic validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),

    #[error("bad style for '{key}': {reason}")]
    BadStyle { key: String, reason: String },

    #[error("status key '{0}' must be a single digit")]
    BadStatusKey(String),
}

/// Parse a status map key as its single leading digit.
pub(crate) fn single_digit(key: &str) -> Option<u8> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

/// Validate a configuration, collecting every finding.
pub fn validate_config(config: &LogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (name, style) in &config.levels {
        if name.parse::<LogLevel>().is_err() {
            errors.push(ValidationError::UnknownLevel(name.clone()));
        }
        if let Err(e) = style.parse::<Style>() {
            errors.push(ValidationError::BadStyle {
                key: name.clone(),
                reason: e.to_string(),
            });
        }
    }

    for (key, style) in &config.status {
        if single_digit(key).is_none() {
            errors.push(ValidationError::BadStatusKey(key.clone()));
        }
        if let Err(e) = style.parse::<Style>() {
            errors.push(ValidationError::BadStyle {
                key: format!("status {key}"),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LogConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = LogConfig::default();
        config.levels.insert("verbose".to_string(), "cyan".to_string());
        config.levels.insert("error".to_string(), "blurple".to_string());
        config.status.insert("2xx".to_string(), "green".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::UnknownLevel("verbose".to_string())));
        assert!(errors.contains(&ValidationError::BadStatusKey("2xx".to_string())));
    }

    #[test]
    fn test_single_digit() {
        assert_eq!(single_digit("2"), Some(2));
        assert_eq!(single_digit("9"), Some(9));
        assert_eq!(single_digit("10"), None);
        assert_eq!(single_digit(""), None);
        assert_eq!(single_digit("x"), None);
    }
}
