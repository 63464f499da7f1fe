//! Output sink abstraction.
//!
//! All request log output funnels through a single [`LogSink`]. The console
//! implementation routes each line to the channel matching its level:
//! errors go to stderr, everything else falls back to stdout.

use std::sync::{Arc, Mutex, PoisonError};

use crate::logger::LogLevel;

/// Destination for formatted request log lines.
pub trait LogSink: Send + Sync {
    /// Write one formatted line on the channel for `level`.
    fn write(&self, level: LogLevel, line: &str);
}

/// Sink writing to the process console.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Error => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }
}

/// Sink collecting lines in memory, in write order.
///
/// Used by the test suites to assert on output; cloning shares the
/// underlying buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for MemorySink {
    fn write(&self, level: LogLevel, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, line.to_string()));
    }
}
