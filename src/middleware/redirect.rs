//! Redirect auto-logging.

use axum::http::header;
use axum::response::Response;

use crate::logger::RequestLog;

/// Log a "Redirecting to <target>" line for 3xx responses.
///
/// Runs before completion accounting, so the line lands in the buffer and
/// is emitted ahead of the end-of-request summary.
pub fn observe(log: &RequestLog, response: &Response) {
    if !response.status().is_redirection() {
        return;
    }

    if let Some(target) = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
    {
        log.log(vec!["Redirecting to".to_string(), target.to_string()]);
    }
}
