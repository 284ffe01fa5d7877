//! Init-time registration API.
//!
//! # Responsibilities
//! - Collect content types, rewrite endpoints and custom rewrite rules
//! - Generate the URL rules of each public content type
//! - Compile everything into an immutable `Registry`
//!
//! # Design Decisions
//! - Registration calls never fail; problems are collected and reported
//!   by `finish`, which fails startup on the first one
//! - Rule order: top rules, content-type rules, bottom rules

use serde::Serialize;

use crate::content::{ContentType, ContentTypeArgs};
use crate::error::SiteError;
use crate::query::vars::{NAME, P, PAGED, POST_TYPE};
use crate::routing::{RewriteRouter, RewriteRule};

/// Longest accepted content type name.
pub const MAX_TYPE_NAME_LEN: usize = 20;

/// Where a custom rewrite rule is placed relative to generated rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RulePosition {
    Top,
    Bottom,
}

/// Which detail URLs an endpoint is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointPlaces {
    AllContentTypes,
    ContentTypes(Vec<String>),
}

impl EndpointPlaces {
    fn includes(&self, content_type: &str) -> bool {
        match self {
            EndpointPlaces::AllContentTypes => true,
            EndpointPlaces::ContentTypes(types) => types.iter().any(|t| t == content_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// URL suffix, e.g. "json".
    pub name: String,
    /// Query var receiving the suffix value.
    pub query_var: String,
    pub places: EndpointPlaces,
}

/// Collects registrations made by `init` actions.
#[derive(Debug, Default)]
pub struct Registrar {
    types: Vec<ContentType>,
    endpoints: Vec<Endpoint>,
    top: Vec<(String, String)>,
    bottom: Vec<(String, String)>,
    errors: Vec<SiteError>,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a content type. Registering a name again replaces it.
    pub fn register_content_type(&mut self, name: &str, args: ContentTypeArgs) {
        if let Err(e) = validate_type_name(name) {
            self.errors.push(e);
            return;
        }
        match self.types.iter_mut().find(|t| t.name == name) {
            Some(existing) => {
                tracing::warn!(content_type = %name, "Content type registered twice, replacing");
                existing.args = args;
            }
            None => self.types.push(ContentType {
                name: name.to_string(),
                args,
            }),
        }
    }

    /// Add a URL suffix endpoint exposing `query_var` on detail URLs.
    pub fn add_rewrite_endpoint(&mut self, name: &str, query_var: &str, places: EndpointPlaces) {
        self.endpoints.push(Endpoint {
            name: name.to_string(),
            query_var: query_var.to_string(),
            places,
        });
    }

    /// Add a custom rule mapping a path regex to a query template.
    pub fn add_rewrite_rule(&mut self, pattern: &str, query: &str, position: RulePosition) {
        let rule = (pattern.to_string(), query.to_string());
        match position {
            RulePosition::Top => self.top.push(rule),
            RulePosition::Bottom => self.bottom.push(rule),
        }
    }

    /// Compile the collected registrations.
    pub fn finish(mut self) -> Result<Registry, SiteError> {
        if !self.errors.is_empty() {
            return Err(self.errors.swap_remove(0));
        }

        let mut raw = std::mem::take(&mut self.top);
        for ty in &self.types {
            raw.extend(self.type_rules(ty));
        }
        raw.append(&mut self.bottom);

        let rules = raw
            .into_iter()
            .map(|(pattern, query)| RewriteRule::new(pattern, query))
            .collect::<Result<Vec<_>, _>>()?;

        let mut query_vars: Vec<String> = [P, NAME, POST_TYPE, PAGED].iter().map(|v| v.to_string()).collect();
        for ty in &self.types {
            if let Some(qv) = ty.query_var() {
                push_unique(&mut query_vars, qv);
            }
        }
        for ep in &self.endpoints {
            push_unique(&mut query_vars, &ep.query_var);
        }

        tracing::debug!(
            content_types = self.types.len(),
            rules = rules.len(),
            query_vars = query_vars.len(),
            "Registrations compiled"
        );

        Ok(Registry {
            content_types: self.types,
            endpoints: self.endpoints,
            rewrite: RewriteRouter::new(rules),
            query_vars,
        })
    }

    fn type_rules(&self, ty: &ContentType) -> Vec<(String, String)> {
        let Some(qv) = ty.query_var() else {
            return Vec::new();
        };
        let mut rules = Vec::new();

        if let Some(archive) = &ty.args.has_archive {
            let archive = quote(archive);
            if ty.args.rewrite.pages {
                rules.push((
                    format!("{}/page/?([0-9]{{1,}})/?$", archive),
                    format!("index.php?{}={}&{}=$matches[1]", POST_TYPE, ty.name, PAGED),
                ));
            }
            rules.push((
                format!("{}/?$", archive),
                format!("index.php?{}={}", POST_TYPE, ty.name),
            ));
        }

        let slug = quote(&ty.args.rewrite.slug);
        for ep in self.endpoints.iter().filter(|ep| ep.places.includes(&ty.name)) {
            rules.push((
                format!("{}/([^/]+)/{}(/(.*))?/?$", slug, quote(&ep.name)),
                format!("index.php?{}=$matches[1]&{}=$matches[3]", qv, ep.query_var),
            ));
        }
        rules.push((
            format!("{}/([^/]+)/?$", slug),
            format!("index.php?{}=$matches[1]", qv),
        ));

        rules
    }
}

/// Compiled registrations, frozen after bootstrap.
#[derive(Debug, Clone)]
pub struct Registry {
    pub content_types: Vec<ContentType>,
    pub endpoints: Vec<Endpoint>,
    pub rewrite: RewriteRouter,
    /// Query vars accepted from URLs, before `query_vars` filters.
    pub query_vars: Vec<String>,
}

impl Registry {
    pub fn content_type(&self, name: &str) -> Option<&ContentType> {
        self.content_types.iter().find(|t| t.name == name)
    }

    pub fn is_public(&self, name: &str) -> bool {
        self.content_type(name).is_some_and(|t| t.args.public)
    }
}

/// Why `name` cannot be a content type name, if it cannot.
pub fn type_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("name is empty")
    } else if name.len() > MAX_TYPE_NAME_LEN {
        Some("name is longer than 20 characters")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        Some("name may only contain a-z, 0-9, '_' and '-'")
    } else {
        None
    }
}

fn validate_type_name(name: &str) -> Result<(), SiteError> {
    match type_name_problem(name) {
        None => Ok(()),
        Some(reason) => Err(SiteError::InvalidContentType {
            name: name.to_string(),
            reason,
        }),
    }
}

/// Escape a literal path segment for use in a rule pattern.
fn quote(segment: &str) -> String {
    if segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '/')
    {
        segment.to_string()
    } else {
        regex::escape(segment)
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Labels, RewriteArgs};

    fn client_args(pages: bool) -> ContentTypeArgs {
        ContentTypeArgs {
            labels: Labels {
                name: "Clients".into(),
                singular_name: "Client".into(),
                add_new_item: "Add New Client".into(),
            },
            has_archive: Some("our-clients".into()),
            public: true,
            menu_icon: Some("dashicons-businessman".into()),
            rewrite: RewriteArgs {
                slug: "work-for".into(),
                feeds: false,
                pages,
            },
            query_var: None,
        }
    }

    fn patterns(registry: &Registry) -> Vec<&str> {
        registry.rewrite.rules().iter().map(|r| r.pattern()).collect()
    }

    #[test]
    fn test_rule_order_top_types_bottom() {
        let mut r = Registrar::new();
        r.add_rewrite_rule("compare/([^/]+)/?$", "index.php?sw_compare=$matches[1]", RulePosition::Bottom);
        r.add_rewrite_rule("^robots\\.txt$", "index.php?robots=1", RulePosition::Top);
        r.register_content_type("sw_client", client_args(false));
        r.add_rewrite_endpoint("json", "sw_json", EndpointPlaces::ContentTypes(vec!["sw_client".into()]));

        let registry = r.finish().unwrap();
        assert_eq!(
            patterns(&registry),
            vec![
                "^robots\\.txt$",
                "our-clients/?$",
                "work-for/([^/]+)/json(/(.*))?/?$",
                "work-for/([^/]+)/?$",
                "compare/([^/]+)/?$",
            ]
        );
    }

    #[test]
    fn test_paged_archive_rule() {
        let mut r = Registrar::new();
        r.register_content_type("sw_client", client_args(true));
        let registry = r.finish().unwrap();

        let m = registry.rewrite.match_path("our-clients/page/2").unwrap();
        assert_eq!(
            m.pairs,
            vec![
                ("post_type".to_string(), "sw_client".to_string()),
                ("paged".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_endpoint_only_on_listed_types() {
        let mut r = Registrar::new();
        r.register_content_type("sw_client", client_args(false));
        let mut other = client_args(false);
        other.rewrite.slug = "team".into();
        other.has_archive = None;
        r.register_content_type("sw_person", other);
        r.add_rewrite_endpoint("json", "sw_json", EndpointPlaces::ContentTypes(vec!["sw_client".into()]));

        let registry = r.finish().unwrap();
        assert!(registry.rewrite.match_path("work-for/alice/json").is_some());
        let m = registry.rewrite.match_path("team/alice/json");
        assert!(m.is_none());
    }

    #[test]
    fn test_query_vars_include_type_and_endpoint_vars() {
        let mut r = Registrar::new();
        r.register_content_type("sw_client", client_args(false));
        r.add_rewrite_endpoint("json", "sw_json", EndpointPlaces::AllContentTypes);

        let registry = r.finish().unwrap();
        assert_eq!(
            registry.query_vars,
            vec!["p", "name", "post_type", "paged", "sw_client", "sw_json"]
        );
    }

    #[test]
    fn test_private_type_gets_no_rules() {
        let mut r = Registrar::new();
        let mut args = client_args(false);
        args.public = false;
        r.register_content_type("sw_client", args);

        let registry = r.finish().unwrap();
        assert!(registry.rewrite.rules().is_empty());
        assert!(!registry.is_public("sw_client"));
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut r = Registrar::new();
        r.register_content_type("sw_client", client_args(false));
        let mut args = client_args(false);
        args.labels.name = "Customers".into();
        r.register_content_type("sw_client", args);

        let registry = r.finish().unwrap();
        assert_eq!(registry.content_types.len(), 1);
        assert_eq!(registry.content_types[0].args.labels.name, "Customers");
    }

    #[test]
    fn test_invalid_type_name_fails_finish() {
        let mut r = Registrar::new();
        r.register_content_type("Clients!", client_args(false));
        assert!(matches!(r.finish(), Err(SiteError::InvalidContentType { .. })));

        let mut r = Registrar::new();
        r.register_content_type("a_very_long_content_type", client_args(false));
        assert!(matches!(r.finish(), Err(SiteError::InvalidContentType { .. })));
    }

    #[test]
    fn test_invalid_rule_fails_finish() {
        let mut r = Registrar::new();
        r.add_rewrite_rule("compare/([^/]+", "index.php?sw_compare=$matches[1]", RulePosition::Bottom);
        assert!(matches!(r.finish(), Err(SiteError::InvalidRewriteRule { .. })));
    }
}
