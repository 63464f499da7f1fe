//! Request logging middleware.
//!
//! # Responsibilities
//! - Attach a fresh [`RequestLog`] to every incoming request
//! - Guarantee completion accounting runs exactly once per request
//! - Catch handler panics: log them, force a flush, re-raise

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};
use futures_util::FutureExt;

use crate::config::{Settings, SharedSettings};
use crate::logger::{LogLevel, RequestLog};
use crate::middleware::{completion, redirect};
use crate::sink::{ConsoleSink, LogSink};
use crate::style::{Style, Tint};

/// Style of the forced error-flush title.
const ERROR_FLUSH: Style = Style::new(Tint::Red, false, true);

/// State shared by every request: resolved settings and the output sink.
#[derive(Clone)]
pub struct RequestLogState {
    settings: SharedSettings,
    sink: Arc<dyn LogSink>,
}

impl RequestLogState {
    /// State with the given settings, writing to the process console.
    pub fn new(settings: Settings) -> Self {
        Self::with_sink(settings, Arc::new(ConsoleSink))
    }

    /// State writing to a custom sink.
    pub fn with_sink(settings: Settings, sink: Arc<dyn LogSink>) -> Self {
        Self {
            settings: settings.into_shared(),
            sink,
        }
    }

    /// Handle for live settings updates (hot reload, immediate toggle).
    pub fn settings(&self) -> SharedSettings {
        self.settings.clone()
    }

    /// Toggle process-wide immediate mode.
    pub fn set_immediate(&self, on: bool) {
        self.settings.rcu(|current| {
            let mut settings = Settings::clone(current);
            settings.immediate = on;
            settings
        });
    }

    /// Install the middleware on a router.
    pub fn attach<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(self, request_log))
    }
}

impl Default for RequestLogState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// The raw middleware function, for direct `from_fn_with_state` use.
///
/// Wraps the downstream handler in a panic boundary: a panicking handler
/// gets its buffered lines and the panic payload flushed under an
/// "ERROR FLUSH" summary before the panic is re-raised to whatever
/// recovery layer sits outside.
pub async fn request_log(
    State(state): State<RequestLogState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let log = RequestLog::new(
        state.settings.clone(),
        state.sink.clone(),
        req.method().clone(),
        req.uri().clone(),
    );
    req.extensions_mut().insert(log.clone());
    tracing::debug!(id = log.id(), "request logger attached");

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => {
            redirect::observe(&log, &response);
            log.set_status(response.status().as_u16());
            completion::on_complete(&log);
            response
        }
        Err(panic) => {
            match panic_message(&panic) {
                Some(message) => log.log_at(LogLevel::Error, vec![message]),
                None => log.log_at(
                    LogLevel::Error,
                    vec![
                        "Domain Error:".to_string(),
                        "<non-string panic payload>".to_string(),
                    ],
                ),
            }
            log.finish(Some(ERROR_FLUSH.paint("ERROR FLUSH")));
            std::panic::resume_unwind(panic);
        }
    }
}

/// Extract a printable message from a panic payload, if it carries one.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> Option<String> {
    if let Some(s) = panic.downcast_ref::<&str>() {
        Some((*s).to_string())
    } else {
        panic.downcast_ref::<String>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_prefers_strings() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("went wrong");
        assert_eq!(panic_message(payload.as_ref()), Some("went wrong".to_string()));

        let payload: Box<dyn std::any::Any + Send> = Box::new("went wrong".to_string());
        assert_eq!(panic_message(payload.as_ref()), Some("went wrong".to_string()));

        let payload: Box<dyn std::any::Any + Send> = Box::new(17u32);
        assert_eq!(panic_message(payload.as_ref()), None);
    }

    #[test]
    fn test_set_immediate_swaps_settings() {
        let state = RequestLogState::default();
        assert!(!state.settings().load().immediate);

        state.set_immediate(true);
        assert!(state.settings().load().immediate);

        state.set_immediate(false);
        assert!(!state.settings().load().immediate);
    }
}
