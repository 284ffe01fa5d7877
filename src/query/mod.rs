//! Query subsystem.
//!
//! # Data Flow
//! ```text
//! path + query string
//!     → parse.rs (rewrite match, merge, public-var whitelist)
//!     → `request` filters (hooks)
//!     → main_query.rs (classify, run against the store, page)
//!     → QueryOutcome
//! ```

pub mod main_query;
pub mod parse;
pub mod vars;

pub use main_query::{MainQuery, QueryOutcome, View};
pub use parse::{ParsedRequest, RequestParser};
pub use vars::{QueryValue, RequestVars};
