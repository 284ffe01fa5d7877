//! Content file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::content::store::MemoryStore;

/// Watches the content file and reloads the store when it changes.
pub struct ContentWatcher {
    path: PathBuf,
    store: MemoryStore,
}

impl ContentWatcher {
    pub fn new(path: &Path, store: MemoryStore) -> Self {
        Self {
            path: path.to_path_buf(),
            store,
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are
    /// wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let store = self.store;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Content file change detected, reloading");
                        if let Err(e) = store.reload_from_file(&path) {
                            tracing::error!(error = %e, "Failed to reload content. Keeping current items.");
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Content watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Content watcher started");
        Ok(watcher)
    }
}
