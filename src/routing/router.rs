//! Rewrite rule lookup.
//!
//! # Responsibilities
//! - Store compiled rules in priority order
//! - Return the first rule matching a path, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(n) scan; rule counts are small

use crate::routing::rule::{RewriteRule, RuleSummary};

/// Result of a successful path match.
#[derive(Debug)]
pub struct RuleMatch<'a> {
    pub rule: &'a RewriteRule,
    /// Query pairs produced by the rule's template, in template order.
    pub pairs: Vec<(String, String)>,
}

/// Ordered set of rewrite rules.
#[derive(Debug, Clone, Default)]
pub struct RewriteRouter {
    rules: Vec<RewriteRule>,
}

impl RewriteRouter {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    /// Find the first rule matching `path`.
    ///
    /// `path` must already be stripped of leading and trailing slashes.
    pub fn match_path(&self, path: &str) -> Option<RuleMatch<'_>> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(path).map(|pairs| RuleMatch { rule, pairs }))
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    pub fn summaries(&self) -> Vec<RuleSummary> {
        self.rules.iter().map(RuleSummary::from).collect()
    }
}
