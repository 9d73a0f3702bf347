//! Initializer file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_initializer;
use crate::config::schema::InitializerFile;

/// Watches an initializer file and emits each valid new version.
pub struct InitializerWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<InitializerFile>,
}

impl InitializerWatcher {
    /// Returns the watcher and a receiver for validated initializer files.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<InitializerFile>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = %path.display(), "Initializer change detected, reloading...");
                        match load_initializer(&path) {
                            Ok(file) => {
                                if tx.send(file).is_err() {
                                    tracing::debug!("Reload receiver dropped");
                                }
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload initializer: {}. Keeping current configuration.",
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

        tracing::info!(path = ?self.path, "Initializer watcher started");
        Ok(watcher)
    }
}
