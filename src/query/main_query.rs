//! Main query: turns final request variables into a store query.
//!
//! # Responsibilities
//! - Classify the request (single, archive, collection, home)
//! - Build the store query and run it
//! - Apply paging to listing views
//!
//! # Design Decisions
//! - An explicit id restriction (`post__in`) always wins, and an empty
//!   restriction matches nothing rather than everything
//! - Single views with no match are 404s; empty listings are not

use serde::Serialize;

use crate::content::{ContentItem, ContentStore, ItemQuery, PostId};
use crate::error::SiteError;
use crate::hooks::Registry;
use crate::query::vars::{RequestVars, NAME, P, PAGED, POST_IN, POST_TYPE};

/// Kind of page being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Single,
    Archive,
    Collection,
    Home,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Single => "single",
            View::Archive => "archive",
            View::Collection => "collection",
            View::Home => "home",
        }
    }
}

/// What the main query found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub view: View,
    pub content_type: Option<String>,
    /// Matches before paging.
    pub found: usize,
    pub page: usize,
    pub items: Vec<ContentItem>,
}

impl QueryOutcome {
    /// The item of a single view.
    pub fn single(&self) -> Option<&ContentItem> {
        match self.view {
            View::Single => self.items.first(),
            _ => None,
        }
    }
}

/// A classified, ready-to-run query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainQuery {
    pub view: View,
    pub query: ItemQuery,
    pub page: usize,
}

impl MainQuery {
    pub fn from_vars(vars: &RequestVars, registry: &Registry) -> Result<Self, SiteError> {
        let post_type = vars.text(POST_TYPE).map(str::to_string);
        if let Some(ty) = &post_type {
            if registry.content_type(ty).is_none() {
                return Err(SiteError::NotFound);
            }
        }

        let page = vars
            .text(PAGED)
            .and_then(|p| p.parse::<usize>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        if let Some(ids) = vars.ids(POST_IN) {
            return Ok(Self {
                view: View::Collection,
                query: ItemQuery {
                    content_type: post_type,
                    name: None,
                    ids: Some(ids.to_vec()),
                },
                page,
            });
        }

        let by_type_var = registry.content_types.iter().find_map(|ty| {
            let name = vars.text(ty.query_var()?)?;
            Some(ItemQuery::by_name(ty.name.clone(), name))
        });
        if let Some(query) = by_type_var {
            return Ok(Self { view: View::Single, query, page: 1 });
        }

        if let Some(name) = vars.text(NAME) {
            return Ok(Self {
                view: View::Single,
                query: ItemQuery {
                    content_type: post_type,
                    name: Some(name.to_string()),
                    ids: None,
                },
                page: 1,
            });
        }

        if let Some(p) = vars.text(P) {
            let id = p.parse::<u64>().map_err(|_| SiteError::NotFound)?;
            return Ok(Self {
                view: View::Single,
                query: ItemQuery {
                    content_type: post_type,
                    name: None,
                    ids: Some(vec![PostId(id)]),
                },
                page: 1,
            });
        }

        let view = if post_type.is_some() { View::Archive } else { View::Home };
        Ok(Self {
            view,
            query: ItemQuery {
                content_type: post_type,
                ..ItemQuery::default()
            },
            page,
        })
    }

    pub fn execute(
        &self,
        store: &dyn ContentStore,
        registry: &Registry,
        per_page: usize,
    ) -> Result<QueryOutcome, SiteError> {
        let mut items = store.query_items(&self.query)?;
        if self.view == View::Home {
            items.retain(|item| registry.is_public(&item.content_type));
        }
        let found = items.len();

        let items = match self.view {
            View::Single => {
                if items.is_empty() {
                    return Err(SiteError::NotFound);
                }
                items.truncate(1);
                items
            }
            _ => items
                .into_iter()
                .skip((self.page - 1).saturating_mul(per_page))
                .take(per_page)
                .collect(),
        };

        Ok(QueryOutcome {
            view: self.view,
            content_type: self.query.content_type.clone(),
            found,
            page: self.page,
            items,
        })
    }
}
