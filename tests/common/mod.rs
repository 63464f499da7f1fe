//! Shared utilities for middleware integration tests.

use std::sync::Arc;

use request_log::{MemorySink, RequestLogState, Settings};

/// State writing to a capture sink, with colours disabled so assertions
/// see plain text.
pub fn capture_state() -> (RequestLogState, MemorySink) {
    colored::control::set_override(false);
    let sink = MemorySink::new();
    let state = RequestLogState::with_sink(Settings::default(), Arc::new(sink.clone()));
    (state, sink)
}

/// Like [`capture_state`], with process-wide immediate mode on.
pub fn capture_state_immediate() -> (RequestLogState, MemorySink) {
    colored::control::set_override(false);
    let mut settings = Settings::default();
    settings.immediate = true;
    let sink = MemorySink::new();
    let state = RequestLogState::with_sink(settings, Arc::new(sink.clone()));
    (state, sink)
}

/// Parse the request id out of a flush header line.
pub fn header_id(line: &str) -> u64 {
    let tag = "[Request #";
    let start = line.find(tag).expect("not a header line") + tag.len();
    let rest = &line[start..];
    let end = rest.find(']').expect("malformed header line");
    rest[..end].parse().expect("request id not numeric")
}
