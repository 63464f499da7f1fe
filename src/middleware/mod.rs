//! Middleware subsystem.
//!
//! # Data Flow
//! ```text
//! incoming request
//!     → layer.rs (create RequestLog, insert into extensions)
//!     → downstream handlers (log through Extension<RequestLog>)
//!     → redirect.rs (auto-log 3xx responses)
//!     → completion.rs (guaranteed end-of-request flush)
//!
//! On handler panic:
//!     layer.rs catches → error line + ERROR FLUSH summary → re-raise
//! ```

pub mod completion;
pub mod layer;
pub mod redirect;

pub use layer::{request_log, RequestLogState};
