//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::LogConfig;
use crate::config::settings::{Settings, SharedSettings};

/// A watcher that monitors the logging configuration file for changes.
pub struct SettingsWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<LogConfig>,
}

impl SettingsWatcher {
    /// Create a new SettingsWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration
    /// updates; pair the receiver with [`apply_updates`].
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<LogConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to fire.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Logging config change detected, reloading...");
                        match load_config(&path) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload logging config: {}. Keeping current settings.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Logging config watcher started");
        Ok(watcher)
    }
}

/// Apply configuration updates to the shared settings as they arrive.
///
/// Runs until the sending side is dropped. A config that fails resolution
/// is rejected and the current settings stay in place.
pub async fn apply_updates(shared: SharedSettings, mut rx: mpsc::UnboundedReceiver<LogConfig>) {
    while let Some(config) = rx.recv().await {
        match Settings::from_config(&config) {
            Ok(settings) => {
                shared.store(Arc::new(settings));
                tracing::info!("Logging settings reloaded");
            }
            Err(errors) => {
                tracing::error!(
                    errors = errors.len(),
                    "Rejected reloaded logging settings. Keeping current settings."
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogLevel;
    use crate::style::{Style, Tint};

    #[tokio::test]
    async fn test_apply_updates_swaps_settings() {
        let shared = Settings::default().into_shared();
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(apply_updates(shared.clone(), rx));

        let mut config = LogConfig::default();
        config.immediate = true;
        tx.send(config).unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(shared.load().immediate);
    }

    #[tokio::test]
    async fn test_apply_updates_keeps_last_good_settings() {
        let shared = Settings::default().into_shared();
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(apply_updates(shared.clone(), rx));

        let mut bad = LogConfig::default();
        bad.levels.insert("shout".to_string(), "red".to_string());
        tx.send(bad).unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(!shared.load().immediate);
        assert_eq!(
            shared.load().level_style(LogLevel::Debug),
            Style::tinted(Tint::Cyan)
        );
    }
}
