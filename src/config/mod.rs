//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → settings.rs (resolve names to styles)
//!     → shared via ArcSwap to every request
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<Settings>
//!     → requests started afterwards observe the new settings
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once resolved; changes swap the whole Arc
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod settings;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::LogConfig;
pub use settings::{Settings, SharedSettings};
pub use validation::ValidationError;
pub use watcher::{apply_updates, SettingsWatcher};
