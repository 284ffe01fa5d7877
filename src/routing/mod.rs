//! Rewrite routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request path (leading/trailing slashes stripped)
//!     → router.rs (ordered rule scan)
//!     → rule.rs (regex match, `$matches[N]` substitution)
//!     → Return: matched rule + raw query pairs, or no match
//!
//! Rule compilation (at startup):
//!     Registrar rules (top, content types, bottom)
//!     → compile regexes
//!     → freeze as immutable RewriteRouter
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Patterns are anchored at the path start only
//! - First match wins; rule order is registration order

pub mod router;
pub mod rule;

pub use router::{RewriteRouter, RuleMatch};
pub use rule::RewriteRule;
