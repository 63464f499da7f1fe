//! Request-scoped logging middleware for axum services.
//!
//! Buffers the log lines a request emits and flushes them as one coherent,
//! annotated block when the request completes or fails, instead of
//! interleaving output from concurrent requests.
//!
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │                 middleware                    │
//!   request ───────┼─▶ attach RequestLog ──▶ handlers log lines    │
//!                  │         │                      │              │
//!                  │         ▼                      ▼              │
//!                  │   panic boundary        logger (buffer)       │
//!                  │         │                      │              │
//!   response ◀─────┼── completion hook ──▶ flush: header + FIFO ───┼──▶ sink
//!                  └──────────────────────────────────────────────┘
//!
//!   Cross-cutting: config (styles, immediate mode, hot reload), style
//!   palette, output sink.
//! ```
//!
//! Handlers extract the logger with `Extension<RequestLog>` and call
//! `log`/`debug`/`info`/`error`, or `flush`/`finish` to end the block
//! early. Mount with [`RequestLogState::attach`].

pub mod config;
pub mod logger;
pub mod middleware;
pub mod sink;
pub mod style;

pub use config::{load_config, ConfigError, LogConfig, Settings, SharedSettings};
pub use logger::{LogLevel, RequestLog};
pub use middleware::{request_log, RequestLogState};
pub use sink::{ConsoleSink, LogSink, MemorySink};
pub use style::{Style, Tint};
