//! Per-request log buffering and flushing.
//!
//! # Responsibilities
//! - Assign a process-unique id to every request
//! - Buffer log lines, or print synchronously in immediate mode
//! - Flush the buffered block under an annotated header, strictly FIFO
//! - Produce the status-annotated end-of-request summary
//!
//! # Design Decisions
//! - One logger per request; handlers share it through a cloneable handle
//! - The id counter is a process-wide atomic; ids are never reused
//! - Draining removes a line before printing it, so a re-entrant flush
//!   cannot print the same line twice

use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{Method, Uri};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::config::SharedSettings;
use crate::logger::{LogLevel, LogLine};
use crate::sink::LogSink;
use crate::style::{Style, Tint};

/// Process-wide request counter. Pre-incremented, so the first id is 1.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Style of the `[Request #n]` header tag.
const HEADER_TAG: Style = Style::new(Tint::Grey, true, false);
/// Style of the header start-time.
const HEADER_TIME: Style = Style::tinted(Tint::Grey);
/// Style of the per-line `[#n]` and `+nms` prefixes.
const LINE_PREFIX: Style = Style::tinted(Tint::White);

/// Current time as milliseconds since the epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn format_clock(epoch_ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64)
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// Cloneable handle to a request's logger.
///
/// The middleware inserts one into request extensions; handlers extract it
/// with `Extension<RequestLog>` and it stays reachable for the life of the
/// request.
#[derive(Clone)]
pub struct RequestLog {
    inner: Arc<RequestLogger>,
}

impl RequestLog {
    pub(crate) fn new(
        settings: SharedSettings,
        sink: Arc<dyn LogSink>,
        method: Method,
        uri: Uri,
    ) -> Self {
        Self {
            inner: Arc::new(RequestLogger {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed) + 1,
                start_ms: now_ms(),
                method,
                uri,
                status: AtomicU16::new(0),
                immediate: AtomicBool::new(false),
                buffer: Mutex::new(BufferState {
                    lines: VecDeque::new(),
                    flushed: false,
                }),
                settings,
                sink,
            }),
        }
    }
}

impl Deref for RequestLog {
    type Target = RequestLogger;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl fmt::Debug for RequestLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLog")
            .field("id", &self.inner.id)
            .field("flushed", &self.inner.flushed())
            .field("buffered", &self.inner.buffered())
            .finish()
    }
}

/// The per-request buffering/flush state machine.
pub struct RequestLogger {
    id: u64,
    start_ms: u64,
    method: Method,
    uri: Uri,
    /// Response status; 0 until completion accounting records it.
    status: AtomicU16,
    /// Per-instance override of the process-wide immediate setting.
    immediate: AtomicBool,
    buffer: Mutex<BufferState>,
    settings: SharedSettings,
    sink: Arc<dyn LogSink>,
}

struct BufferState {
    lines: VecDeque<LogLine>,
    flushed: bool,
}

impl RequestLogger {
    /// Process-unique request id, assigned once at creation.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Milliseconds since this logger was created.
    pub fn elapsed_ms(&self) -> u64 {
        now_ms().saturating_sub(self.start_ms)
    }

    /// Whether a flush has happened.
    pub fn flushed(&self) -> bool {
        self.lock().flushed
    }

    /// Number of lines currently buffered.
    pub fn buffered(&self) -> usize {
        self.lock().lines.len()
    }

    /// Toggle synchronous printing for this request only.
    pub fn set_immediate(&self, on: bool) {
        self.immediate.store(on, Ordering::Relaxed);
    }

    pub(crate) fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::Relaxed);
    }

    fn status(&self) -> Option<u16> {
        match self.status.load(Ordering::Relaxed) {
            0 => None,
            status => Some(status),
        }
    }

    // Logging must never panic, even if a caller panicked mid-call; a
    // poisoned buffer is taken over as-is.
    fn lock(&self) -> std::sync::MutexGuard<'_, BufferState> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Untagged entry point; the level defaults to [`LogLevel::Log`].
    ///
    /// Every value is a value: there is no first-argument level sniffing.
    pub fn log(&self, values: Vec<String>) {
        self.log_at(LogLevel::Log, values);
    }

    /// Level-tagged entry point.
    ///
    /// Buffers the line, or prints it synchronously when this instance or
    /// the process-wide settings are in immediate mode.
    pub fn log_at(&self, level: LogLevel, values: Vec<String>) {
        let timestamp_ms = now_ms();
        if self.immediate.load(Ordering::Relaxed) || self.settings.load().immediate {
            self.print(level, timestamp_ms, &values);
        } else {
            self.lock()
                .lines
                .push_back(LogLine::new(level, timestamp_ms, values));
        }
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        self.log_at(LogLevel::Debug, vec![msg.to_string()]);
    }

    pub fn info(&self, msg: impl fmt::Display) {
        self.log_at(LogLevel::Info, vec![msg.to_string()]);
    }

    pub fn error(&self, msg: impl fmt::Display) {
        self.log_at(LogLevel::Error, vec![msg.to_string()]);
    }

    /// Log a serializable value as one compact JSON segment.
    pub fn log_json<T: Serialize>(&self, level: LogLevel, value: &T) {
        let rendered = serde_json::to_string(value)
            .unwrap_or_else(|e| format!("<unserializable: {e}>"));
        self.log_at(level, vec![rendered]);
    }

    /// Flush the buffered block: mark the logger flushed, print the header
    /// with the caller-supplied title, then drain the buffer strictly FIFO.
    pub fn flush(&self, title: Vec<String>) {
        self.lock().flushed = true;

        let mut header = vec![
            HEADER_TAG.paint(&format!("[Request #{}]", self.id)),
            HEADER_TIME.paint(&format_clock(self.start_ms)),
        ];
        header.extend(title);
        self.sink.write(LogLevel::Info, &header.join(" "));

        loop {
            // take the line out before printing it
            let line = self.lock().lines.pop_front();
            match line {
                Some(line) => self.print(line.level, line.timestamp_ms, &line.values),
                None => break,
            }
        }
    }

    /// Format and write one line: `[#id] +<elapsed>ms <values...>`, with the
    /// values painted in the level's style, on the level's channel.
    fn print(&self, level: LogLevel, timestamp_ms: u64, values: &[String]) {
        let settings = self.settings.load();
        let line = format!(
            "{} {} {}",
            LINE_PREFIX.paint(&format!("[#{}]", self.id)),
            LINE_PREFIX.paint(&format!("+{}ms", timestamp_ms.saturating_sub(self.start_ms))),
            settings.level_style(level).paint(&values.join(" ")),
        );
        self.sink.write(level, &line);
    }

    /// Flush with the canonical end-of-request summary as the title:
    /// `[title] <method> <uri> <status> <elapsed>ms`, painted in the style of
    /// the status class (500 when the status was never recorded).
    pub fn finish(&self, title: Option<String>) {
        let status = self.status().unwrap_or(500);
        let style = self.settings.load().status_style(status);

        let mut parts: Vec<String> = Vec::new();
        if let Some(title) = title {
            parts.push(title);
        }
        parts.push(self.method.to_string());
        parts.push(self.uri.to_string());
        parts.push(status.to_string());
        parts.push(format!("{}ms", self.elapsed_ms()));

        self.flush(vec![style.paint(&parts.join(" "))]);
    }
}

impl Drop for RequestLogger {
    fn drop(&mut self) {
        // A dropped request future never reaches completion accounting;
        // surface the loss instead of flushing out of order.
        let state = self
            .buffer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if !state.flushed && !state.lines.is_empty() {
            tracing::warn!(
                id = self.id,
                lines = state.lines.len(),
                "request logger dropped with unflushed lines"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::sink::MemorySink;

    fn test_logger(sink: &MemorySink) -> RequestLog {
        colored::control::set_override(false);
        RequestLog::new(
            Settings::default().into_shared(),
            Arc::new(sink.clone()),
            Method::GET,
            Uri::from_static("/test"),
        )
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let sink = MemorySink::new();
        let a = test_logger(&sink);
        let b = test_logger(&sink);
        let c = test_logger(&sink);

        assert!(a.id() >= 1);
        assert!(a.id() < b.id());
        assert!(b.id() < c.id());
    }

    #[test]
    fn test_flush_drains_fifo() {
        let sink = MemorySink::new();
        let log = test_logger(&sink);

        log.info("first");
        log.log(vec!["second".to_string()]);
        log.error("third");
        assert_eq!(log.buffered(), 3);
        assert!(sink.lines().is_empty());

        log.flush(vec!["done".to_string()]);

        let lines = sink.lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].0, LogLevel::Info);
        assert!(lines[0].1.contains(&format!("[Request #{}]", log.id())));
        assert!(lines[0].1.ends_with("done"));
        assert!(lines[1].1.ends_with("first"));
        assert!(lines[2].1.ends_with("second"));
        assert_eq!(lines[2].0, LogLevel::Log);
        assert!(lines[3].1.ends_with("third"));
        assert_eq!(lines[3].0, LogLevel::Error);

        assert_eq!(log.buffered(), 0);
        assert!(log.flushed());
    }

    #[test]
    fn test_order_is_per_logger_despite_interleaving() {
        let sink_a = MemorySink::new();
        let sink_b = MemorySink::new();
        let a = test_logger(&sink_a);
        let b = test_logger(&sink_b);

        a.info("a1");
        b.info("b1");
        a.info("a2");
        b.info("b2");
        a.flush(Vec::new());
        b.flush(Vec::new());

        let bodies: Vec<_> = sink_a.lines().into_iter().skip(1).collect();
        assert!(bodies[0].1.ends_with("a1"));
        assert!(bodies[1].1.ends_with("a2"));

        let bodies: Vec<_> = sink_b.lines().into_iter().skip(1).collect();
        assert!(bodies[0].1.ends_with("b1"));
        assert!(bodies[1].1.ends_with("b2"));
    }

    #[test]
    fn test_flush_on_empty_buffer_prints_header_only() {
        let sink = MemorySink::new();
        let log = test_logger(&sink);

        log.flush(vec!["Request Finished".to_string()]);

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].1.contains("Request Finished"));
    }

    #[test]
    fn test_non_level_values_stay_values() {
        let sink = MemorySink::new();
        let log = test_logger(&sink);

        // "notALevel" is a value, not a level tag
        log.log(vec!["notALevel".to_string(), "x".to_string()]);
        log.flush(Vec::new());

        let lines = sink.lines();
        assert_eq!(lines[1].0, LogLevel::Log);
        assert!(lines[1].1.ends_with("notALevel x"));
    }

    #[test]
    fn test_immediate_override_prints_synchronously() {
        let sink = MemorySink::new();
        let log = test_logger(&sink);

        log.set_immediate(true);
        log.debug("x");

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, LogLevel::Debug);
        assert!(lines[0].1.ends_with("x"));
        assert_eq!(log.buffered(), 0);
    }

    #[test]
    fn test_line_prefix_carries_id_and_elapsed() {
        let sink = MemorySink::new();
        let log = test_logger(&sink);

        log.info("step");
        log.flush(Vec::new());

        let body = &sink.lines()[1].1;
        assert!(body.starts_with(&format!("[#{}] +", log.id())));
        assert!(body.contains("ms"));
    }

    #[test]
    fn test_finish_defaults_to_500_when_status_unset() {
        let sink = MemorySink::new();
        let log = test_logger(&sink);

        log.finish(None);

        let header = &sink.lines()[0].1;
        assert!(header.contains("GET /test 500"));
        assert!(header.ends_with("ms"));
    }

    #[test]
    fn test_finish_includes_title_and_status() {
        let sink = MemorySink::new();
        let log = test_logger(&sink);

        log.set_status(404);
        log.finish(Some("ERROR FLUSH".to_string()));

        let header = &sink.lines()[0].1;
        assert!(header.contains("ERROR FLUSH GET /test 404"));
    }

    #[test]
    fn test_log_json_renders_compact() {
        #[derive(Serialize)]
        struct Payload {
            user: &'static str,
            tries: u32,
        }

        let sink = MemorySink::new();
        let log = test_logger(&sink);

        log.log_json(LogLevel::Debug, &Payload { user: "ada", tries: 2 });
        log.flush(Vec::new());

        assert!(sink.lines()[1].1.ends_with(r#"{"user":"ada","tries":2}"#));
    }

    #[test]
    fn test_reflush_prints_header_only() {
        let sink = MemorySink::new();
        let log = test_logger(&sink);

        log.info("once");
        log.flush(Vec::new());
        let after_first = sink.lines().len();

        log.flush(vec!["Request Finished".to_string()]);

        let lines = sink.lines();
        assert_eq!(lines.len(), after_first + 1);
        assert!(lines[after_first].1.contains("Request Finished"));
    }
}
