pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::get,
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

/// Admin routes, all behind Bearer authentication.
pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/rewrite-rules", get(get_rewrite_rules))
        .route("/admin/content-types", get(get_content_types))
        .route("/admin/clients", get(get_clients).post(create_client))
        .route(RESOLVE_PREFIX, get(resolve))
        .route(&format!("{}/{{*path}}", RESOLVE_PREFIX), get(resolve))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
