//! Request parsing: path and query string to request variables.
//!
//! # Responsibilities
//! - Match the path against rewrite rules
//! - Merge query string pairs over rule output
//! - Drop every variable that is not a public query var
//!
//! # Design Decisions
//! - The path is matched raw (no percent-decoding), so a literal `+`
//!   stays a `+`
//! - The query string is form-decoded; there `+` means a space
//! - Query string values override values produced by the rule

use serde::Serialize;

use crate::error::SiteError;
use crate::query::vars::RequestVars;
use crate::routing::RewriteRouter;

/// Result of parsing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRequest {
    /// Pattern of the rewrite rule that matched, if any.
    pub matched_rule: Option<String>,
    pub vars: RequestVars,
}

/// Frozen parsing tables.
#[derive(Debug, Clone)]
pub struct RequestParser {
    rewrite: RewriteRouter,
    public_vars: Vec<String>,
}

impl RequestParser {
    pub fn new(rewrite: RewriteRouter, public_vars: Vec<String>) -> Self {
        Self { rewrite, public_vars }
    }

    pub fn rewrite(&self) -> &RewriteRouter {
        &self.rewrite
    }

    pub fn public_vars(&self) -> &[String] {
        &self.public_vars
    }

    fn is_public(&self, key: &str) -> bool {
        self.public_vars.iter().any(|v| v == key)
    }

    /// Parse `path` and the optional raw query string.
    ///
    /// A non-empty path that no rule matches is `NotFound`.
    pub fn parse(&self, path: &str, query: Option<&str>) -> Result<ParsedRequest, SiteError> {
        let path = path.trim_matches('/');

        let mut vars = RequestVars::new();
        let mut matched_rule = None;
        if !path.is_empty() {
            let m = self.rewrite.match_path(path).ok_or(SiteError::NotFound)?;
            tracing::debug!(path = %path, matched_rule = %m.rule.pattern(), "Rewrite rule matched");
            matched_rule = Some(m.rule.pattern().to_string());
            for (key, value) in m.pairs {
                vars.insert(key, value);
            }
        }

        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                vars.insert(key.into_owned(), value.into_owned());
            }
        }

        vars.retain(|key| {
            let keep = self.is_public(key);
            if !keep {
                tracing::trace!(var = %key, "Dropping non-public query var");
            }
            keep
        });

        Ok(ParsedRequest { matched_rule, vars })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::vars::QueryValue;
    use crate::routing::RewriteRule;

    fn parser() -> RequestParser {
        let rules = vec![
            RewriteRule::new("work-for/([^/]+)/json(/(.*))?/?$", "index.php?sw_client=$matches[1]&sw_json=$matches[3]").unwrap(),
            RewriteRule::new("work-for/([^/]+)/?$", "index.php?sw_client=$matches[1]").unwrap(),
            RewriteRule::new("compare/([^/]+)/?$", "index.php?sw_compare=$matches[1]").unwrap(),
            RewriteRule::new("secret/?$", "index.php?post__in=1").unwrap(),
        ];
        let public = ["p", "name", "post_type", "paged", "sw_client", "sw_json", "sw_compare"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        RequestParser::new(RewriteRouter::new(rules), public)
    }

    #[test]
    fn test_compare_path_keeps_plus() {
        let parsed = parser().parse("/compare/alice+bob/", None).unwrap();
        assert_eq!(parsed.matched_rule.as_deref(), Some("compare/([^/]+)/?$"));
        assert_eq!(parsed.vars.text("sw_compare"), Some("alice+bob"));
    }

    #[test]
    fn test_endpoint_without_value_is_present_but_empty() {
        let parsed = parser().parse("/work-for/alice/json", None).unwrap();
        assert_eq!(parsed.vars.text("sw_client"), Some("alice"));
        assert_eq!(parsed.vars.get("sw_json"), Some(&QueryValue::Text(String::new())));
    }

    #[test]
    fn test_home_has_no_rule() {
        let parsed = parser().parse("/", None).unwrap();
        assert_eq!(parsed.matched_rule, None);
        assert!(parsed.vars.is_empty());
    }

    #[test]
    fn test_unmatched_path_is_not_found() {
        assert!(matches!(parser().parse("/about/team", None), Err(SiteError::NotFound)));
    }

    #[test]
    fn test_query_string_overrides_and_is_whitelisted() {
        let parsed = parser()
            .parse("/work-for/alice", Some("sw_client=bob&post__in=1,2&paged=2"))
            .unwrap();
        assert_eq!(parsed.vars.text("sw_client"), Some("bob"));
        assert_eq!(parsed.vars.text("paged"), Some("2"));
        assert!(!parsed.vars.contains("post__in"));
    }

    #[test]
    fn test_private_vars_from_rules_are_dropped() {
        let parsed = parser().parse("/secret", None).unwrap();
        assert!(parsed.vars.is_empty());
    }

    #[test]
    fn test_query_string_plus_is_space() {
        let parsed = parser().parse("/", Some("sw_compare=alice+bob")).unwrap();
        assert_eq!(parsed.vars.text("sw_compare"), Some("alice bob"));
    }
}
