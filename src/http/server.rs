//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the site and admin handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Run the site pipeline on a blocking worker per request
//! - Observability (metrics, correlation IDs)

use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::observability::metrics;
use crate::site::Site;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
    pub config: Arc<SiteConfig>,
    pub started_at: Instant,
}

/// HTTP server for the site.
pub struct HttpServer {
    router: Router,
    config: Arc<SiteConfig>,
}

impl HttpServer {
    /// Create a new HTTP server serving `site`.
    pub fn new(config: SiteConfig, site: Arc<Site>) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            site,
            config: config.clone(),
            started_at: Instant::now(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SiteConfig, state: AppState) -> Router {
        let mut router = Router::new();
        if config.admin.enabled {
            router = router.merge(setup_admin_router(state.clone()));
        }
        router
            .fallback(site_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            admin = self.config.admin.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}

/// Public site handler.
/// Parses the URL, runs the main query and renders the page.
async fn site_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);

    if method != Method::GET && method != Method::HEAD {
        metrics::record_request("none", 405, start_time);
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path().to_string();
    let query = uri.query().map(str::to_string);

    tracing::debug!(
        request_id = %request_id,
        path = %path,
        "Serving request"
    );

    let site = state.site.clone();
    let worker_path = path.clone();
    let result = tokio::task::spawn_blocking(move || site.handle(&worker_path, query.as_deref()))
        .await
        .map_err(|e| SiteError::Worker(e.to_string()))
        .and_then(|r| r);

    match result {
        Ok(page) => {
            metrics::record_request(page.view.as_str(), 200, start_time);
            tracing::debug!(request_id = %request_id, view = page.view.as_str(), "Page rendered");
            page.into_response()
        }
        Err(e) => {
            let status = e.status();
            metrics::record_request("none", status.as_u16(), start_time);
            if status == StatusCode::NOT_FOUND {
                tracing::debug!(request_id = %request_id, path = %path, "Nothing found");
            } else {
                tracing::warn!(request_id = %request_id, path = %path, error = %e, "Site error");
            }
            e.into_response()
        }
    }
}
