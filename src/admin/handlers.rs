use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::content::{ContentItem, ContentType, ItemQuery, NewItem};
use crate::error::SiteError;
use crate::hooks::registrar::Endpoint;
use crate::hooks::RequestContext;
use crate::http::server::AppState;
use crate::plugin::clients::COMPARE_SEPARATOR;
use crate::query::ParsedRequest;
use crate::routing::rule::RuleSummary;

/// Mount point of the resolve routes.
pub const RESOLVE_PREFIX: &str = "/admin/resolve";

#[derive(Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub uptime_secs: u64,
    pub content_types: usize,
    pub rewrite_rules: usize,
    pub items: usize,
}

#[derive(Serialize)]
pub struct ContentTypesReport {
    pub content_types: Vec<ContentType>,
    pub endpoints: Vec<Endpoint>,
    pub query_vars: Vec<String>,
}

/// Body of `POST /admin/clients`.
#[derive(Debug, Deserialize, Serialize)]
pub struct NewClient {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let registry = state.site.registry();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        content_types: registry.content_types.len(),
        rewrite_rules: registry.rewrite.rules().len(),
        items: state.site.store().len(),
    })
}

pub async fn get_rewrite_rules(State(state): State<AppState>) -> Json<Vec<RuleSummary>> {
    Json(state.site.parser().rewrite().summaries())
}

pub async fn get_content_types(State(state): State<AppState>) -> Json<ContentTypesReport> {
    let registry = state.site.registry();
    Json(ContentTypesReport {
        content_types: registry.content_types.clone(),
        endpoints: registry.endpoints.clone(),
        query_vars: state.site.parser().public_vars().to_vec(),
    })
}

pub async fn get_clients(State(state): State<AppState>) -> Result<Json<Vec<ContentItem>>, SiteError> {
    let content_type = state.config.clients.content_type.clone();
    let site = state.site.clone();
    let items = tokio::task::spawn_blocking(move || site.store().query_items(&ItemQuery::of_type(content_type)))
        .await
        .map_err(|e| SiteError::Worker(e.to_string()))??;
    Ok(Json(items))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(body): Json<NewClient>,
) -> Response {
    if body.name.is_empty() || body.name.contains('/') || body.name.contains(COMPARE_SEPARATOR) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "invalid_name" })),
        )
            .into_response();
    }

    let item = NewItem {
        id: None,
        content_type: state.config.clients.content_type.clone(),
        name: body.name,
        title: body.title,
        fields: body.fields,
    };
    let site = state.site.clone();
    let result = tokio::task::spawn_blocking(move || site.store().insert(item))
        .await
        .map_err(|e| SiteError::Worker(e.to_string()))
        .and_then(|r| r.map_err(SiteError::from));

    match result {
        Ok(item) => {
            tracing::info!(id = %item.id, name = %item.name, "Client created");
            (StatusCode::CREATED, Json(item)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Parse a path as the site would, in admin context.
///
/// The path after `/admin/resolve` is taken from the raw URI, undecoded,
/// exactly as the public handler sees it.
pub async fn resolve(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<ParsedRequest>, SiteError> {
    let path = uri
        .path()
        .strip_prefix(RESOLVE_PREFIX)
        .unwrap_or_default()
        .to_string();
    let query = uri.query().map(str::to_string);
    let site = state.site.clone();
    let parsed = tokio::task::spawn_blocking(move || {
        site.resolve(&path, query.as_deref(), &RequestContext { is_admin: true })
    })
    .await
    .map_err(|e| SiteError::Worker(e.to_string()))??;
    Ok(Json(parsed))
}
