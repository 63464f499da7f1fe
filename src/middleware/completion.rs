//! Completion accounting.
//!
//! Runs exactly once per request, after the response is produced. The
//! branch keeps output readable when an error path already forced a flush:
//! an empty, already-flushed logger only gets a confirmation header, while
//! everything else gets the full status-annotated summary.

use crate::logger::{LogLevel, RequestLog};

pub fn on_complete(log: &RequestLog) {
    if log.buffered() == 0 && log.flushed() {
        log.flush(vec!["Request Finished".to_string()]);
    } else {
        log.log_at(LogLevel::Info, vec!["Request Finished".to_string()]);
        log.finish(None);
    }
}
