//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the content store
//! - Register plugins and bootstrap the site
//! - Start the content watcher when configured
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Steps run in order, not concurrently

use notify::RecommendedWatcher;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::watcher::ContentWatcher;
use crate::content::{ContentStore, MemoryStore, StoreError};
use crate::error::SiteError;
use crate::plugin::default_plugins;
use crate::site::Site;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("loading content failed: {0}")]
    Content(#[from] StoreError),

    #[error("site bootstrap failed: {0}")]
    Site(#[from] SiteError),

    #[error("content watcher failed: {0}")]
    Watch(#[from] notify::Error),
}

/// Everything `main` needs to keep alive.
pub struct Started {
    pub site: Arc<Site>,
    pub store: MemoryStore,
    /// Dropping the watcher stops reloads.
    pub watcher: Option<RecommendedWatcher>,
}

/// Run the startup sequence for `config`.
pub fn start(config: &SiteConfig) -> Result<Started, StartupError> {
    let store = match &config.content.path {
        Some(path) => MemoryStore::load_from_file(path)?,
        None => MemoryStore::new(None),
    };
    tracing::info!(items = store.len(), "Content loaded");

    let shared: Arc<dyn ContentStore> = Arc::new(store.clone());
    let plugins = default_plugins(config, shared.clone());
    let site = Site::bootstrap(shared, plugins, config.site.posts_per_page)?;

    let watcher = match (&config.content.path, config.content.watch) {
        (Some(path), true) => Some(ContentWatcher::new(path, store.clone()).run()?),
        _ => None,
    };

    Ok(Started {
        site: Arc::new(site),
        store,
        watcher,
    })
}
