//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address formats
//! - Check the clients plugin URL settings can form rewrite rules
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{SiteConfig, PLACEHOLDER_API_KEY};
use crate::hooks::registrar::type_name_problem;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check the configuration, collecting every problem.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("listener.bind_address", "not a socket address"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.site.posts_per_page == 0 {
        errors.push(ValidationError::new("site.posts_per_page", "must be greater than 0"));
    }

    let clients = &config.clients;
    let ty = &clients.content_type;
    if let Some(problem) = type_name_problem(ty) {
        errors.push(ValidationError::new("clients.content_type", problem));
    }
    check_segment(&mut errors, "clients.slug", &clients.slug);
    check_segment(&mut errors, "clients.json_endpoint", &clients.json_endpoint);
    check_segment(&mut errors, "clients.compare_base", &clients.compare_base);
    if let Some(archive) = &clients.has_archive {
        check_segment(&mut errors, "clients.has_archive", archive);
    }
    if clients.json_var.is_empty() {
        errors.push(ValidationError::new("clients.json_var", "must not be empty"));
    }
    if clients.compare_var.is_empty() {
        errors.push(ValidationError::new("clients.compare_var", "must not be empty"));
    }
    if clients.json_var == clients.compare_var {
        errors.push(ValidationError::new(
            "clients.compare_var",
            "must differ from clients.json_var",
        ));
    }

    let obs = &config.observability;
    if !matches!(obs.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            "must be \"pretty\" or \"json\"",
        ));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    if config.admin.enabled && (config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_API_KEY) {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be set when the admin API is enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A single non-empty path segment.
fn check_segment(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
    } else if value.contains('/') {
        errors.push(ValidationError::new(field, "must not contain '/'"));
    }
}
