//! Per-request logging core.
//!
//! # Data Flow
//! ```text
//! handler calls (debug/info/error/log)
//!     → level.rs (typed level taxonomy)
//!     → line.rs (buffered {level, timestamp, values} record)
//!     → request_log.rs (buffer, or print immediately)
//!
//! On completion / error:
//!     flush → header + FIFO drain → sink
//!     finish → status-annotated summary title → flush
//! ```
//!
//! # Design Decisions
//! - Lines from one request are never interleaved with another request's;
//!   the whole block is emitted at flush time
//! - Immediate mode trades coherence for liveness, per request or globally

pub mod level;
pub mod line;
pub mod request_log;

pub use level::{LogLevel, UnknownLevel};
pub use line::LogLine;
pub use request_log::{RequestLog, RequestLogger};
