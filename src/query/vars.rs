//! Request variables.
//!
//! The decoded request context handed from URL parsing to the main query.
//! Built fresh per request and never persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::content::PostId;

/// Item id, looked up by number.
pub const P: &str = "p";
/// Item slug.
pub const NAME: &str = "name";
/// Content type restriction.
pub const POST_TYPE: &str = "post_type";
/// Archive page number.
pub const PAGED: &str = "paged";
/// Explicit id restriction. Never accepted from a URL.
pub const POST_IN: &str = "post__in";

/// A single request variable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Flag(bool),
    Text(String),
    Ids(Vec<PostId>),
}

impl QueryValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            QueryValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&[PostId]> {
        match self {
            QueryValue::Ids(ids) => Some(ids),
            _ => None,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Flag(true) => f.write_str("1"),
            QueryValue::Flag(false) => Ok(()),
            QueryValue::Text(s) => f.write_str(s),
            QueryValue::Ids(ids) => {
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", id)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Text(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Text(s)
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::Flag(b)
    }
}

impl From<Vec<PostId>> for QueryValue {
    fn from(ids: Vec<PostId>) -> Self {
        QueryValue::Ids(ids)
    }
}

/// Mapping from variable name to value, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestVars(BTreeMap<String, QueryValue>);

impl RequestVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    /// The value of `key` if it holds text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(QueryValue::as_text)
    }

    /// The value of `key` if it holds an id list.
    pub fn ids(&self, key: &str) -> Option<&[PostId]> {
        self.get(key).and_then(QueryValue::as_ids)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Option<QueryValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.0.remove(key)
    }

    /// Keep only the keys accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|key, _| keep(key));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for RequestVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
