//! Site-level error type.

use thiserror::Error;

use crate::content::StoreError;

/// Errors raised while bootstrapping the site or serving a request.
#[derive(Debug, Error)]
pub enum SiteError {
    /// No route, content type or item matches the request.
    #[error("not found")]
    NotFound,

    /// The content store failed. Not retried.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A rewrite rule pattern does not compile.
    #[error("invalid rewrite rule `{pattern}`: {source}")]
    InvalidRewriteRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid content type `{name}`: {reason}")]
    InvalidContentType { name: String, reason: &'static str },

    /// The blocking request worker panicked or was cancelled.
    #[error("request worker failed: {0}")]
    Worker(String),
}
