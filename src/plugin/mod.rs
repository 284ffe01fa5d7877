//! Site plugins.

pub mod clients;

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::hooks::Plugin;

pub use clients::{normalize_json_endpoint, resolve_compare, ClientsPlugin};

/// The plugins loaded at startup.
pub fn default_plugins(config: &SiteConfig, store: Arc<dyn ContentStore>) -> Vec<Arc<dyn Plugin>> {
    vec![Arc::new(ClientsPlugin::new(config.clients.clone(), store))]
}
