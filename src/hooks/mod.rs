//! Typed event subscription.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Plugin::register(&mut Hooks)   (once per plugin)
//!     → `init` actions run against the Registrar
//!     → `query_vars` filters extend the public query-var list
//!
//! Per request:
//!     `request` filters transform RequestVars
//!     → main query
//!     → `template` hooks may replace the rendered body
//! ```
//!
//! # Design Decisions
//! - Lower priority runs first; equal priorities run in registration order
//! - Filters take and return values instead of mutating shared state
//! - The hook table is frozen once the site is bootstrapped

pub mod registrar;

use std::sync::Arc;

use crate::error::SiteError;
use crate::query::main_query::QueryOutcome;
use crate::query::vars::RequestVars;

pub use registrar::{EndpointPlaces, Registrar, Registry, RulePosition};

/// Priority used when a plugin has no ordering preference.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Per-request facts available to request filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// The request comes from the admin surface.
    pub is_admin: bool,
}

type InitAction = Box<dyn Fn(&mut Registrar) + Send + Sync>;
type QueryVarsFilter = Box<dyn Fn(Vec<String>) -> Vec<String> + Send + Sync>;
type RequestFilter =
    Box<dyn Fn(RequestVars, &RequestContext) -> Result<RequestVars, SiteError> + Send + Sync>;
type TemplateHook =
    Box<dyn Fn(&RequestVars, &QueryOutcome) -> Option<serde_json::Value> + Send + Sync>;

struct Subscriber<F> {
    priority: i32,
    callback: F,
}

/// Insert keeping priority order, after existing equal priorities.
fn subscribe<F>(list: &mut Vec<Subscriber<F>>, priority: i32, callback: F) {
    let at = list.partition_point(|s| s.priority <= priority);
    list.insert(at, Subscriber { priority, callback });
}

/// Registered callbacks, grouped by event.
#[derive(Default)]
pub struct Hooks {
    init: Vec<Subscriber<InitAction>>,
    query_vars: Vec<Subscriber<QueryVarsFilter>>,
    request: Vec<Subscriber<RequestFilter>>,
    template: Vec<Subscriber<TemplateHook>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `init`: runs once at startup with the registrar.
    pub fn on_init<F>(&mut self, priority: i32, f: F)
    where
        F: Fn(&mut Registrar) + Send + Sync + 'static,
    {
        subscribe(&mut self.init, priority, Box::new(f));
    }

    /// Subscribe to `query_vars`: transforms the public query-var list.
    pub fn on_query_vars<F>(&mut self, priority: i32, f: F)
    where
        F: Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static,
    {
        subscribe(&mut self.query_vars, priority, Box::new(f));
    }

    /// Subscribe to `request`: transforms parsed request variables.
    pub fn on_request<F>(&mut self, priority: i32, f: F)
    where
        F: Fn(RequestVars, &RequestContext) -> Result<RequestVars, SiteError> + Send + Sync + 'static,
    {
        subscribe(&mut self.request, priority, Box::new(f));
    }

    /// Subscribe to `template`: the first hook returning a body wins.
    pub fn on_template<F>(&mut self, priority: i32, f: F)
    where
        F: Fn(&RequestVars, &QueryOutcome) -> Option<serde_json::Value> + Send + Sync + 'static,
    {
        subscribe(&mut self.template, priority, Box::new(f));
    }

    pub fn run_init(&self, registrar: &mut Registrar) {
        for s in &self.init {
            (s.callback)(registrar);
        }
    }

    pub fn apply_query_vars(&self, vars: Vec<String>) -> Vec<String> {
        self.query_vars.iter().fold(vars, |vars, s| (s.callback)(vars))
    }

    /// Run every request filter; the first error aborts the chain.
    pub fn apply_request(&self, vars: RequestVars, ctx: &RequestContext) -> Result<RequestVars, SiteError> {
        self.request
            .iter()
            .try_fold(vars, |vars, s| (s.callback)(vars, ctx))
    }

    pub fn render(&self, vars: &RequestVars, outcome: &QueryOutcome) -> Option<serde_json::Value> {
        self.template.iter().find_map(|s| (s.callback)(vars, outcome))
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("init", &self.init.len())
            .field("query_vars", &self.query_vars.len())
            .field("request", &self.request.len())
            .field("template", &self.template.len())
            .finish()
    }
}

/// A unit of site functionality that subscribes to hooks.
pub trait Plugin: Send + Sync + 'static {
    /// Unique plugin name; a second plugin with the same name is skipped.
    fn name(&self) -> &'static str;

    /// Subscribe callbacks. Called exactly once, at bootstrap.
    fn register(self: Arc<Self>, hooks: &mut Hooks);
}
