//! Clients plugin.
//!
//! Registers the client content type with its JSON endpoint, and adds
//! `compare/<name>+<name>...` URLs that list several clients at once.
//!
//! ```text
//! init        → content type, `json` endpoint, compare rewrite rule
//! query_vars  → + compare var
//! request     → normalize_json_endpoint, resolve_compare (not for admin)
//! template    → bare item JSON for JSON endpoint requests
//! ```

use std::sync::Arc;

use crate::config::ClientsConfig;
use crate::content::{ContentStore, ContentTypeArgs, ItemQuery, Labels, PostId, RewriteArgs, StoreError};
use crate::error::SiteError;
use crate::hooks::{EndpointPlaces, Hooks, Plugin, Registrar, RequestContext, RulePosition, DEFAULT_PRIORITY};
use crate::observability::metrics;
use crate::query::main_query::QueryOutcome;
use crate::query::vars::{QueryValue, RequestVars, POST_IN, POST_TYPE};

/// Separator between names in a compare URL segment.
pub const COMPARE_SEPARATOR: char = '+';

pub struct ClientsPlugin {
    settings: ClientsConfig,
    store: Arc<dyn ContentStore>,
}

impl ClientsPlugin {
    pub fn new(settings: ClientsConfig, store: Arc<dyn ContentStore>) -> Self {
        Self { settings, store }
    }

    /// Registration arguments of the client content type.
    pub fn content_type_args(&self) -> ContentTypeArgs {
        let s = &self.settings;
        ContentTypeArgs {
            labels: Labels {
                name: s.labels.name.clone(),
                singular_name: s.labels.singular_name.clone(),
                add_new_item: s.labels.add_new_item.clone(),
            },
            has_archive: s.has_archive.clone(),
            public: s.public,
            menu_icon: s.menu_icon.clone(),
            rewrite: RewriteArgs {
                slug: s.slug.clone(),
                feeds: s.feeds,
                pages: s.pages,
            },
            query_var: None,
        }
    }

    fn action_init(&self, registrar: &mut Registrar) {
        let s = &self.settings;
        registrar.register_content_type(&s.content_type, self.content_type_args());
        registrar.add_rewrite_endpoint(
            &s.json_endpoint,
            &s.json_var,
            EndpointPlaces::ContentTypes(vec![s.content_type.clone()]),
        );
        registrar.add_rewrite_rule(
            &format!("{}/([^/]+)/?$", regex::escape(&s.compare_base)),
            &format!("index.php?{}=$matches[1]", s.compare_var),
            RulePosition::Bottom,
        );
    }

    fn filter_query_vars(&self, mut vars: Vec<String>) -> Vec<String> {
        vars.push(self.settings.compare_var.clone());
        vars
    }

    fn filter_request(&self, vars: RequestVars, ctx: &RequestContext) -> Result<RequestVars, SiteError> {
        if ctx.is_admin {
            return Ok(vars);
        }
        let s = &self.settings;
        let vars = normalize_json_endpoint(vars, &s.json_var, &s.content_type);
        let vars = resolve_compare(vars, self.store.as_ref(), &s.compare_var, &s.content_type)?;
        Ok(vars)
    }

    fn render_json(&self, vars: &RequestVars, outcome: &QueryOutcome) -> Option<serde_json::Value> {
        if vars.get(&self.settings.json_var) != Some(&QueryValue::Flag(true)) {
            return None;
        }
        let item = outcome.single()?;
        if item.content_type != self.settings.content_type {
            return None;
        }
        serde_json::to_value(item).ok()
    }
}

impl Plugin for ClientsPlugin {
    fn name(&self) -> &'static str {
        "clients"
    }

    fn register(self: Arc<Self>, hooks: &mut Hooks) {
        let this = Arc::clone(&self);
        hooks.on_init(DEFAULT_PRIORITY, move |registrar| this.action_init(registrar));

        let this = Arc::clone(&self);
        hooks.on_query_vars(DEFAULT_PRIORITY, move |vars| this.filter_query_vars(vars));

        let this = Arc::clone(&self);
        hooks.on_request(DEFAULT_PRIORITY, move |vars, ctx| this.filter_request(vars, ctx));

        hooks.on_template(DEFAULT_PRIORITY, move |vars, outcome| self.render_json(vars, outcome));
    }
}

/// Turn the JSON endpoint var into a flag.
///
/// With both `json_var` and `client_var` present, `json_var` becomes
/// `true` whatever its value. Otherwise `json_var` is removed.
pub fn normalize_json_endpoint(mut vars: RequestVars, json_var: &str, client_var: &str) -> RequestVars {
    if vars.contains(json_var) && vars.contains(client_var) {
        vars.insert(json_var, QueryValue::Flag(true));
    } else {
        vars.remove(json_var);
    }
    vars
}

/// Resolve a compare request into an id restriction.
///
/// Without `compare_var` the vars are returned untouched. Otherwise the
/// value is split on `+` (empty tokens kept), each token is looked up by
/// name within `content_type` in order, one query per token, and the ids
/// are concatenated without de-duplication into `post__in`. `post_type`
/// is set to `content_type`. A store error aborts the resolution.
pub fn resolve_compare(
    mut vars: RequestVars,
    store: &dyn ContentStore,
    compare_var: &str,
    content_type: &str,
) -> Result<RequestVars, StoreError> {
    let Some(raw) = vars.get(compare_var).map(QueryValue::to_string) else {
        return Ok(vars);
    };

    let mut ids: Vec<PostId> = Vec::new();
    let mut tokens = 0usize;
    for name in raw.split(COMPARE_SEPARATOR) {
        tokens += 1;
        let found = store.query_ids(&ItemQuery::by_name(content_type, name))?;
        tracing::trace!(name = %name, matches = found.len(), "Compare lookup");
        ids.extend(found);
    }

    tracing::debug!(tokens, ids = ids.len(), "Compare request resolved");
    metrics::record_compare(tokens, ids.len());

    vars.insert(POST_IN, QueryValue::Ids(ids));
    vars.insert(POST_TYPE, QueryValue::Text(content_type.to_string()));
    Ok(vars)
}
