//! Content storage.
//!
//! # Responsibilities
//! - Answer identifier-only and full-record queries
//! - Hold items in memory, shared across request workers
//! - Seed from and persist to a JSON content file

use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::content::types::{ContentItem, NewItem, PostId};

/// Errors raised by a content store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot serve queries.
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    #[error("content file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("content file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate item id {0}")]
    DuplicateId(PostId),
}

/// Selection criteria for a store query. Unset fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub content_type: Option<String>,
    pub name: Option<String>,

    /// Restrict to these ids, returned in this order. An empty list
    /// matches nothing.
    pub ids: Option<Vec<PostId>>,
}

impl ItemQuery {
    /// Items of `content_type` whose name equals `name`.
    pub fn by_name(content_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            name: Some(name.into()),
            ids: None,
        }
    }

    /// Every item of `content_type`.
    pub fn of_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Self::default()
        }
    }

    fn matches(&self, item: &ContentItem) -> bool {
        if let Some(ty) = &self.content_type {
            if &item.content_type != ty {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if &item.name != name {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&item.id) {
                return false;
            }
        }
        true
    }
}

/// Storage layer queried by the main query and the plugins.
///
/// Calls block; async callers must run them on a blocking worker.
pub trait ContentStore: Send + Sync {
    /// Identifiers of matching items.
    fn query_ids(&self, query: &ItemQuery) -> Result<Vec<PostId>, StoreError>;

    /// Full matching records.
    fn query_items(&self, query: &ItemQuery) -> Result<Vec<ContentItem>, StoreError>;

    /// Store a new item and return it with its assigned id.
    fn insert(&self, item: NewItem) -> Result<ContentItem, StoreError>;

    /// Number of stored items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One generation of store contents. Reloads build a new one and swap it in.
#[derive(Debug)]
struct Contents {
    items: DashMap<PostId, ContentItem>,
    next_id: AtomicU64,
}

impl Contents {
    /// Place every explicit id first, then number the rest after the
    /// highest id seen. A repeated explicit id is an error.
    fn build(items: impl IntoIterator<Item = NewItem>) -> Result<Self, StoreError> {
        let contents = Contents {
            items: DashMap::new(),
            next_id: AtomicU64::new(1),
        };
        let mut implicit = Vec::new();
        for item in items {
            match item.id {
                Some(id) => {
                    if contents.items.contains_key(&id) {
                        return Err(StoreError::DuplicateId(id));
                    }
                    contents.put(item);
                }
                None => implicit.push(item),
            }
        }
        for item in implicit {
            contents.put(item);
        }
        Ok(contents)
    }

    fn put(&self, item: NewItem) -> ContentItem {
        let id = match item.id {
            Some(id) => {
                self.next_id.fetch_max(id.0.saturating_add(1), Ordering::SeqCst);
                id
            }
            None => PostId(self.next_id.fetch_add(1, Ordering::SeqCst)),
        };
        let stored = ContentItem {
            id,
            content_type: item.content_type,
            name: item.name,
            title: item.title,
            fields: item.fields,
        };
        self.items.insert(id, stored.clone());
        stored
    }

    /// Matching items ordered by id.
    fn sorted(&self, filter: impl Fn(&ContentItem) -> bool) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self
            .items
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by_key(|item| item.id);
        items
    }

    fn select(&self, query: &ItemQuery) -> Vec<ContentItem> {
        match &query.ids {
            // Explicit id lists keep caller order, each item once.
            Some(ids) => {
                let mut seen = HashSet::new();
                ids.iter()
                    .filter(|id| seen.insert(**id))
                    .filter_map(|id| self.items.get(id).map(|entry| entry.value().clone()))
                    .filter(|item| query.matches(item))
                    .collect()
            }
            None => self.sorted(|item| query.matches(item)),
        }
    }
}

/// A thread-safe in-memory store.
///
/// Readers always see one complete generation of contents: a reload
/// swaps the whole map, it never clears the live one.
#[derive(Clone)]
pub struct MemoryStore {
    contents: Arc<ArcSwap<Contents>>,
    persistence_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            contents: Arc::new(ArcSwap::from_pointee(Contents {
                items: DashMap::new(),
                next_id: AtomicU64::new(1),
            })),
            persistence_path,
        }
    }

    /// Create a store holding `items`, without persistence.
    pub fn with_items(items: impl IntoIterator<Item = NewItem>) -> Result<Self, StoreError> {
        let store = Self::new(None);
        store.replace_all(items)?;
        Ok(store)
    }

    /// Load from file if it exists. Inserts made later are written back.
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            store.reload_from_file(path)?;
        }
        Ok(store)
    }

    /// Replace all items with the contents of `path`.
    pub fn reload_from_file(&self, path: &Path) -> Result<usize, StoreError> {
        let file = File::open(path)?;
        let items: Vec<NewItem> = serde_json::from_reader(BufReader::new(file))?;
        self.replace_all(items)
    }

    /// Replace all items at once. Returns the new item count.
    ///
    /// On error the current items stay in place.
    pub fn replace_all(&self, items: impl IntoIterator<Item = NewItem>) -> Result<usize, StoreError> {
        let contents = Contents::build(items)?;
        let count = contents.items.len();
        self.contents.store(Arc::new(contents));
        tracing::info!(items = count, "Content store loaded");
        Ok(count)
    }

    /// Write every item to the persistence file, if one is configured.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let items = self.contents.load().sorted(|_| true);
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &items)?;
        tracing::debug!(path = ?path, items = items.len(), "Content store persisted");
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ContentStore for MemoryStore {
    fn query_ids(&self, query: &ItemQuery) -> Result<Vec<PostId>, StoreError> {
        Ok(self.contents.load().select(query).into_iter().map(|item| item.id).collect())
    }

    fn query_items(&self, query: &ItemQuery) -> Result<Vec<ContentItem>, StoreError> {
        Ok(self.contents.load().select(query))
    }

    /// Stored only once persisted: a failed save leaves the store as it was.
    fn insert(&self, item: NewItem) -> Result<ContentItem, StoreError> {
        let contents = self.contents.load_full();
        if let Some(id) = item.id {
            if contents.items.contains_key(&id) {
                return Err(StoreError::DuplicateId(id));
            }
        }
        let implicit = item.id.is_none();
        let stored = contents.put(item);

        if let Err(e) = self.save() {
            contents.items.remove(&stored.id);
            if implicit {
                let _ = contents.next_id.compare_exchange(
                    stored.id.0.saturating_add(1),
                    stored.id.0,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                );
            }
            return Err(e);
        }
        Ok(stored)
    }

    fn len(&self) -> usize {
        self.contents.load().items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture() -> MemoryStore {
        MemoryStore::with_items([
            NewItem::new("sw_client", "alice", "Alice Ltd").with_id(10),
            NewItem::new("sw_client", "bob", "Bob & Co").with_id(20),
            NewItem::new("sw_client", "bob", "Bob Holdings").with_id(21),
            NewItem::new("page", "alice", "About Alice").with_id(30),
        ])
        .unwrap()
    }

    #[test]
    fn test_query_ids_by_name_filters_on_type() {
        let store = fixture();
        let ids = store.query_ids(&ItemQuery::by_name("sw_client", "alice")).unwrap();
        assert_eq!(ids, vec![PostId(10)]);
    }

    #[test]
    fn test_duplicate_names_return_every_match() {
        let store = fixture();
        let ids = store.query_ids(&ItemQuery::by_name("sw_client", "bob")).unwrap();
        assert_eq!(ids, vec![PostId(20), PostId(21)]);
    }

    #[test]
    fn test_unknown_name_is_empty_not_error() {
        let store = fixture();
        let ids = store.query_ids(&ItemQuery::by_name("sw_client", "ghost")).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_id_restriction_keeps_order_and_dedups() {
        let store = fixture();
        let query = ItemQuery {
            content_type: Some("sw_client".into()),
            ids: Some(vec![PostId(21), PostId(10), PostId(21), PostId(30)]),
            ..ItemQuery::default()
        };
        let ids: Vec<_> = store
            .query_items(&query)
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec![PostId(21), PostId(10)]);
    }

    #[test]
    fn test_empty_id_restriction_matches_nothing() {
        let store = fixture();
        let query = ItemQuery {
            ids: Some(Vec::new()),
            ..ItemQuery::default()
        };
        assert!(store.query_items(&query).unwrap().is_empty());
    }

    #[test]
    fn test_insert_assigns_ids_after_seeded_ones() {
        let store = fixture();
        let item = store.insert(NewItem::new("sw_client", "carol", "Carol plc")).unwrap();
        assert_eq!(item.id, PostId(31));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_load_and_persist_round_trip_through_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 5, "content_type": "sw_client", "name": "alice", "title": "Alice Ltd"}}]"#
        )
        .unwrap();

        let store = MemoryStore::load_from_file(file.path()).unwrap();
        assert_eq!(store.len(), 1);

        store.insert(NewItem::new("sw_client", "bob", "Bob & Co")).unwrap();

        let reloaded = MemoryStore::load_from_file(file.path()).unwrap();
        let ids = reloaded.query_ids(&ItemQuery::of_type("sw_client")).unwrap();
        assert_eq!(ids, vec![PostId(5), PostId(6)]);
    }

    #[test]
    fn test_missing_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load_from_file(&dir.path().join("content.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_file_is_a_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            MemoryStore::load_from_file(file.path()),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_implicit_ids_never_collide_with_explicit_ones() {
        let store = MemoryStore::with_items([
            NewItem::new("sw_client", "alice", "Alice Ltd"),
            NewItem::new("sw_client", "bob", "Bob & Co").with_id(1),
        ])
        .unwrap();
        assert_eq!(store.len(), 2);

        let alice = store.query_ids(&ItemQuery::by_name("sw_client", "alice")).unwrap();
        assert_eq!(alice, vec![PostId(2)]);
    }

    #[test]
    fn test_repeated_explicit_id_is_rejected() {
        let result = MemoryStore::with_items([
            NewItem::new("sw_client", "alice", "Alice Ltd").with_id(7),
            NewItem::new("sw_client", "bob", "Bob & Co").with_id(7),
        ]);
        assert!(matches!(result, Err(StoreError::DuplicateId(PostId(7)))));
    }

    #[test]
    fn test_failed_reload_keeps_current_items() {
        let store = fixture();
        let result = store.replace_all([
            NewItem::new("sw_client", "x", "X").with_id(1),
            NewItem::new("sw_client", "y", "Y").with_id(1),
        ]);
        assert!(result.is_err());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_largest_id_does_not_overflow() {
        let store = MemoryStore::with_items([NewItem::new("sw_client", "max", "Max").with_id(u64::MAX)]).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_readers_never_see_a_partial_reload() {
        let store = MemoryStore::with_items([NewItem::new("sw_client", "alice", "Alice Ltd").with_id(10)]).unwrap();
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let writer = {
            let store = store.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    store
                        .replace_all([NewItem::new("sw_client", "alice", "Alice Ltd").with_id(10)])
                        .unwrap();
                }
            })
        };

        let query = ItemQuery::by_name("sw_client", "alice");
        let misses = (0..20_000)
            .filter(|_| store.query_ids(&query).unwrap() != vec![PostId(10)])
            .count();
        done.store(true, Ordering::Relaxed);
        writer.join().unwrap();

        assert_eq!(misses, 0);
    }

    #[test]
    fn test_insert_is_undone_when_save_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(Some(dir.path().join("missing").join("content.json")));

        let result = store.insert(NewItem::new("sw_client", "alice", "Alice Ltd"));
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(store.is_empty());
        assert!(store
            .query_ids(&ItemQuery::by_name("sw_client", "alice"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_insert_rejects_taken_id() {
        let store = fixture();
        let result = store.insert(NewItem::new("sw_client", "dave", "Dave Inc").with_id(10));
        assert!(matches!(result, Err(StoreError::DuplicateId(PostId(10)))));
        assert_eq!(store.len(), 4);
    }
}
