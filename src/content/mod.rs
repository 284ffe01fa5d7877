//! Content subsystem.
//!
//! # Data Flow
//! ```text
//! content file (JSON array of items)
//!     → store.rs (MemoryStore::load_from_file)
//!     → queried by the main query and by plugin filters
//!
//! On file change:
//!     watcher.rs detects change
//!     → MemoryStore::reload_from_file
//!     → subsequent requests see the new items
//! ```
//!
//! # Design Decisions
//! - The store contract is synchronous; callers on async threads hop to a
//!   blocking worker first
//! - Item names are not unique; name lookups may return many ids
//! - Identifier-only lookups are a separate call so callers never pay for
//!   full records they drop

pub mod store;
pub mod types;
pub mod watcher;

pub use store::{ContentStore, ItemQuery, MemoryStore, StoreError};
pub use types::{ContentItem, ContentType, ContentTypeArgs, Labels, NewItem, PostId, RewriteArgs};
