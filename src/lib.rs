//! Web addresses: a small rewrite-driven site engine with a clients plugin.

pub mod admin;
pub mod config;
pub mod content;
pub mod error;
pub mod hooks;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod plugin;
pub mod query;
pub mod routing;
pub mod site;

pub use config::schema::SiteConfig;
pub use error::SiteError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use site::Site;
