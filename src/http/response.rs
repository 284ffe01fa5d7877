//! Response mapping.
//!
//! # Responsibilities
//! - Map site errors to HTTP status codes
//! - Render pages and errors as JSON
//!
//! # Design Decisions
//! - Internal errors are logged, never echoed to clients
//! - Missing content and unmatched URLs are both plain 404s

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::SiteError;
use crate::site::Page;

impl SiteError {
    pub fn status(&self) -> StatusCode {
        match self {
            SiteError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = if status == StatusCode::NOT_FOUND {
            "not_found"
        } else {
            tracing::error!(error = %self, "Request failed");
            "internal_error"
        };
        (status, Json(json!({ "error": code }))).into_response()
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::StoreError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(SiteError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        let err = SiteError::Store(StoreError::Unavailable("down".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
