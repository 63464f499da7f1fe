//! Log level taxonomy.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Severity/category of a request log line.
///
/// `Log` is the level used by the untagged entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Log,
    Info,
    Error,
}

impl LogLevel {
    /// All levels, in ascending severity order.
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Log,
        LogLevel::Info,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Log => "log",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(LogLevel::Debug),
            "log" => Ok(LogLevel::Log),
            "info" => Ok(LogLevel::Info),
            "error" => Ok(LogLevel::Error),
            other => Err(UnknownLevel(other.to_string())),
        }
    }
}

/// A name that is not in the level taxonomy.
///
/// Only configuration parsing cares; the logging API itself has no way to
/// name an invalid level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}'")]
pub struct UnknownLevel(pub String);
