//! The site: frozen hook table, registrations and store, serving requests.
//!
//! # Data Flow
//! ```text
//! bootstrap:
//!     plugins → Hooks (once each)
//!     → `init` actions → Registrar → Registry
//!     → `query_vars` filters → RequestParser
//!
//! handle(path, query):
//!     RequestParser::parse → `request` filters
//!     → MainQuery → ContentStore
//!     → `template` hooks or default envelope
//! ```

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::content::ContentStore;
use crate::error::SiteError;
use crate::hooks::{Hooks, Plugin, Registrar, Registry, RequestContext};
use crate::query::{MainQuery, ParsedRequest, QueryOutcome, RequestParser, View};

/// A rendered page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub view: View,
    pub body: serde_json::Value,
}

pub struct Site {
    hooks: Hooks,
    registry: Registry,
    parser: RequestParser,
    store: Arc<dyn ContentStore>,
    posts_per_page: usize,
}

impl Site {
    /// Register every plugin once, run `init` and freeze the result.
    pub fn bootstrap(
        store: Arc<dyn ContentStore>,
        plugins: Vec<Arc<dyn Plugin>>,
        posts_per_page: usize,
    ) -> Result<Self, SiteError> {
        let mut hooks = Hooks::new();
        let mut loaded = HashSet::new();
        for plugin in plugins {
            let name = plugin.name();
            if !loaded.insert(name) {
                tracing::warn!(plugin = %name, "Plugin already registered, skipping");
                continue;
            }
            plugin.register(&mut hooks);
            tracing::info!(plugin = %name, "Plugin registered");
        }

        let mut registrar = Registrar::new();
        hooks.run_init(&mut registrar);
        let registry = registrar.finish()?;

        let public_vars = hooks.apply_query_vars(registry.query_vars.clone());
        let parser = RequestParser::new(registry.rewrite.clone(), public_vars);

        tracing::info!(
            content_types = registry.content_types.len(),
            rewrite_rules = registry.rewrite.rules().len(),
            "Site bootstrapped"
        );

        Ok(Self {
            hooks,
            registry,
            parser,
            store,
            posts_per_page: posts_per_page.max(1),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn parser(&self) -> &RequestParser {
        &self.parser
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Parse a request and run the `request` filters.
    pub fn resolve(
        &self,
        path: &str,
        query: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<ParsedRequest, SiteError> {
        let mut parsed = self.parser.parse(path, query)?;
        parsed.vars = self.hooks.apply_request(parsed.vars, ctx)?;
        Ok(parsed)
    }

    /// Serve a public request. Blocks on the store.
    pub fn handle(&self, path: &str, query: Option<&str>) -> Result<Page, SiteError> {
        let parsed = self.resolve(path, query, &RequestContext::default())?;
        let main = MainQuery::from_vars(&parsed.vars, &self.registry)?;
        let outcome = main.execute(self.store.as_ref(), &self.registry, self.posts_per_page)?;

        let body = match self.hooks.render(&parsed.vars, &outcome) {
            Some(body) => body,
            None => envelope(&parsed, &outcome),
        };
        Ok(Page {
            view: outcome.view,
            body,
        })
    }
}

fn envelope(parsed: &ParsedRequest, outcome: &QueryOutcome) -> serde_json::Value {
    serde_json::json!({
        "view": outcome.view,
        "matched_rule": parsed.matched_rule,
        "query_vars": parsed.vars,
        "found": outcome.found,
        "page": outcome.page,
        "items": outcome.items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{MemoryStore, NewItem};
    use crate::plugin::default_plugins;
    use serde_json::json;

    fn site() -> Site {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::with_items([
            NewItem::new("sw_client", "alice", "Alice Ltd").with_id(10),
            NewItem::new("sw_client", "bob", "Bob & Co").with_id(20),
            NewItem::new("sw_client", "bob", "Bob Holdings").with_id(21),
        ])
        .unwrap());
        let config = SiteConfig::default();
        Site::bootstrap(store.clone(), default_plugins(&config, store), 10).unwrap()
    }

    fn item_ids(page: &Page) -> Vec<u64> {
        page.body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_u64().unwrap())
            .collect()
    }

    #[test]
    fn test_compare_page() {
        let page = site().handle("/compare/alice+bob", None).unwrap();
        assert_eq!(page.view, View::Collection);
        assert_eq!(item_ids(&page), vec![10, 20, 21]);
        assert_eq!(page.body["query_vars"]["post__in"], json!([10, 20, 21]));
        assert_eq!(page.body["query_vars"]["post_type"], json!("sw_client"));
        assert_eq!(page.body["matched_rule"], json!("compare/([^/]+)/?$"));
    }

    #[test]
    fn test_compare_with_unknown_name_is_empty_not_unrestricted() {
        let page = site().handle("/compare/ghost", None).unwrap();
        assert_eq!(page.view, View::Collection);
        assert!(item_ids(&page).is_empty());
        assert_eq!(page.body["found"], json!(0));
    }

    #[test]
    fn test_json_endpoint_renders_bare_item() {
        let page = site().handle("/work-for/alice/json", None).unwrap();
        assert_eq!(page.view, View::Single);
        assert_eq!(page.body["name"], json!("alice"));
        assert_eq!(page.body["title"], json!("Alice Ltd"));
        assert!(page.body.get("items").is_none());
    }

    #[test]
    fn test_detail_page_uses_envelope() {
        let page = site().handle("/work-for/alice", None).unwrap();
        assert_eq!(page.view, View::Single);
        assert_eq!(item_ids(&page), vec![10]);
    }

    #[test]
    fn test_stray_json_flag_is_dropped() {
        let page = site().handle("/our-clients", Some("sw_json=1")).unwrap();
        assert_eq!(page.view, View::Archive);
        assert!(page.body["query_vars"].get("sw_json").is_none());
    }

    #[test]
    fn test_admin_resolve_skips_filters() {
        let site = site();
        let parsed = site
            .resolve("/compare/alice", None, &RequestContext { is_admin: true })
            .unwrap();
        assert_eq!(parsed.vars.text("sw_compare"), Some("alice"));
        assert!(!parsed.vars.contains("post__in"));
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        assert!(matches!(site().handle("/nowhere/at/all", None), Err(SiteError::NotFound)));
    }

    #[test]
    fn test_duplicate_plugins_register_once() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::default());
        let config = SiteConfig::default();
        let mut plugins = default_plugins(&config, store.clone());
        plugins.extend(default_plugins(&config, store.clone()));

        let site = Site::bootstrap(store, plugins, 10).unwrap();
        let compare_vars = site
            .parser()
            .public_vars()
            .iter()
            .filter(|v| v.as_str() == "sw_compare")
            .count();
        assert_eq!(compare_vars, 1);
        assert_eq!(site.registry().rewrite.rules().len(), 4);
    }
}
