//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the site.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Listing settings.
    pub site: ListingConfig,

    /// Content file settings.
    pub content: ContentConfig,

    /// Clients plugin settings.
    pub clients: ClientsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Listing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Items per page on archive, home and collection views.
    pub posts_per_page: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { posts_per_page: 10 }
    }
}

/// Content file configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContentConfig {
    /// JSON file seeding the store; admin inserts are written back to it.
    pub path: Option<PathBuf>,

    /// Reload the store when the file changes.
    pub watch: bool,
}

/// Labels shown for the clients content type.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientLabels {
    pub name: String,
    pub singular_name: String,
    pub add_new_item: String,
}

impl Default for ClientLabels {
    fn default() -> Self {
        Self {
            name: "Clients".to_string(),
            singular_name: "Client".to_string(),
            add_new_item: "Add New Client".to_string(),
        }
    }
}

/// Clients plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientsConfig {
    /// Content type name.
    pub content_type: String,

    pub labels: ClientLabels,

    /// Base slug of client detail URLs.
    pub slug: String,

    /// Archive listing path.
    pub has_archive: Option<String>,

    pub public: bool,

    pub menu_icon: Option<String>,

    pub feeds: bool,

    pub pages: bool,

    /// URL suffix of the JSON endpoint.
    pub json_endpoint: String,

    /// Query var set by the JSON endpoint.
    pub json_var: String,

    /// First path segment of compare URLs.
    pub compare_base: String,

    /// Query var carrying the compared names.
    pub compare_var: String,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            content_type: "sw_client".to_string(),
            labels: ClientLabels::default(),
            slug: "work-for".to_string(),
            has_archive: Some("our-clients".to_string()),
            public: true,
            menu_icon: Some("dashicons-businessman".to_string()),
            feeds: false,
            pages: false,
            json_endpoint: "json".to_string(),
            json_var: "sw_json".to_string(),
            compare_base: "compare".to_string(),
            compare_var: "sw_compare".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the admin API under `/admin`.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

/// Placeholder admin key; rejected by validation when admin is enabled.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
        }
    }
}
