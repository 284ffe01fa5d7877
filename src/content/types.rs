//! Content type and item definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a stored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A stored content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: PostId,

    /// Registered content type this item belongs to (e.g. "sw_client").
    pub content_type: String,

    /// URL slug. Not guaranteed unique.
    pub name: String,

    pub title: String,

    /// Free-form structured fields.
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// An item as submitted for insertion; the id is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub id: Option<PostId>,
    pub content_type: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl NewItem {
    /// Shorthand for an item without extra fields.
    pub fn new(content_type: impl Into<String>, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            content_type: content_type.into(),
            name: name.into(),
            title: title.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Pin the identifier.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(PostId(id));
        self
    }
}

/// Human-readable labels of a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub name: String,
    pub singular_name: String,
    pub add_new_item: String,
}

/// URL settings of a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteArgs {
    /// Base slug of detail URLs (`<slug>/<name>`).
    pub slug: String,

    /// Whether feed URLs are generated. Feeds are never rendered.
    pub feeds: bool,

    /// Whether archive pagination URLs are generated.
    pub pages: bool,
}

/// Arguments for registering a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeArgs {
    pub labels: Labels,

    /// Archive listing path, if the type has one.
    pub has_archive: Option<String>,

    /// Non-public types get no URLs and no query var.
    pub public: bool,

    pub menu_icon: Option<String>,

    pub rewrite: RewriteArgs,

    /// Query var carrying the item name on detail URLs.
    /// Defaults to the type name.
    pub query_var: Option<String>,
}

/// A registered content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentType {
    pub name: String,
    #[serde(flatten)]
    pub args: ContentTypeArgs,
}

impl ContentType {
    /// The query var exposed on detail URLs, or `None` for private types.
    pub fn query_var(&self) -> Option<&str> {
        if !self.args.public {
            return None;
        }
        Some(self.args.query_var.as_deref().unwrap_or(&self.name))
    }
}
