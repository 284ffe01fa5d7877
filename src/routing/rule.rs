//! A single rewrite rule.
//!
//! A rule pairs a path regex with a query template such as
//! `index.php?sw_compare=$matches[1]`. On match, every `$matches[N]` in
//! the template is replaced by capture group N (empty if the group did
//! not participate).

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

use crate::error::SiteError;

static MATCH_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$matches\[(\d+)\]").expect("static pattern compiles"));

/// A compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: String,
    query: String,
    regex: Regex,
    template: Vec<(String, String)>,
}

impl RewriteRule {
    /// Compile a rule. The pattern is anchored at the start of the path.
    pub fn new(pattern: impl Into<String>, query: impl Into<String>) -> Result<Self, SiteError> {
        let pattern = pattern.into();
        let query = query.into();
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            SiteError::InvalidRewriteRule {
                pattern: pattern.clone(),
                source,
            }
        })?;
        let template = parse_template(&query);
        Ok(Self {
            pattern,
            query,
            regex,
            template,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Match `path` and return the substituted query pairs.
    pub fn apply(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.template
                .iter()
                .map(|(key, value)| (key.clone(), substitute(value, &caps)))
                .collect(),
        )
    }
}

/// Serializable view of a rule for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub pattern: String,
    pub query: String,
}

impl From<&RewriteRule> for RuleSummary {
    fn from(rule: &RewriteRule) -> Self {
        Self {
            pattern: rule.pattern.clone(),
            query: rule.query.clone(),
        }
    }
}

fn parse_template(query: &str) -> Vec<(String, String)> {
    let query = query.split_once('?').map_or(query, |(_, q)| q);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn substitute(value: &str, caps: &Captures<'_>) -> String {
    MATCH_REF
        .replace_all(value, |m: &Captures<'_>| {
            m[1].parse::<usize>()
                .ok()
                .and_then(|i| caps.get(i))
                .map_or(String::new(), |g| g.as_str().to_string())
        })
        .into_owned()
}
