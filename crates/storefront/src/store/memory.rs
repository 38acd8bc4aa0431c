//! In-process document store.
//!
//! Collections keep insertion order so unordered reads behave like a real
//! store's "natural" order. Failure switches let tests exercise the
//! catalog's fallback paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use safeguard_core::DocumentId;
use serde_json::Value;

use super::{Document, DocumentStore, Fields, NewDocument, Query, StoreError, generate_document_id};

/// In-memory [`DocumentStore`].
///
/// Cheaply cloneable; clones share the same collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    missing_key_index: AtomicBool,
    unavailable: AtomicBool,
    queries: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document synchronously (for seeding).
    pub fn insert(&self, collection: &str, id: impl Into<DocumentId>, fields: Fields) {
        if let Ok(mut collections) = self.inner.collections.lock() {
            upsert(
                collections.entry(collection.to_owned()).or_default(),
                Document::new(id, fields),
            );
        }
    }

    /// Make every key-ordered query fail with [`StoreError::MissingIndex`].
    pub fn set_missing_key_index(&self, missing: bool) {
        self.inner.missing_key_index.store(missing, Ordering::SeqCst);
    }

    /// Make every operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of queries run so far.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.inner.queries.load(Ordering::SeqCst)
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of a collection in insertion order.
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .ok()
            .and_then(|c| c.get(collection).cloned())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<Document>>>, StoreError> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.inner
            .collections
            .lock()
            .map_err(|_| StoreError::Backend {
                status: "INTERNAL".to_string(),
                message: "memory store lock poisoned".to_string(),
            })
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| &d.id == id))
            .cloned())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.inner.queries.fetch_add(1, Ordering::SeqCst);

        if query.order_by_key && self.inner.missing_key_index.load(Ordering::SeqCst) {
            return Err(StoreError::MissingIndex(format!(
                "ordering {} by document key requires an index",
                query.collection
            )));
        }

        let collections = self.lock()?;
        let mut docs: Vec<Document> = collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| {
                        query.filter.as_ref().is_none_or(|f| {
                            d.fields.get(&f.field).is_some_and(|v| values_equal(v, &f.value))
                        })
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        if query.order_by_key {
            docs.sort_by(|a, b| a.id.cmp(&b.id));
        }
        if let Some(after) = &query.start_after {
            docs.retain(|d| &d.id > after);
        }
        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }

        Ok(docs)
    }

    async fn create(&self, collection: &str, document: NewDocument) -> Result<DocumentId, StoreError> {
        let mut fields = document.fields;
        if let Some(field) = document.server_timestamp {
            fields.insert(field.to_owned(), Value::String(chrono::Utc::now().to_rfc3339()));
        }

        let id = generate_document_id();
        let mut collections = self.lock()?;
        collections
            .entry(collection.to_owned())
            .or_default()
            .push(Document::new(id.clone(), fields));
        drop(collections);

        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn put(&self, collection: &str, id: &DocumentId, fields: Fields) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        upsert(
            collections.entry(collection.to_owned()).or_default(),
            Document::new(id.clone(), fields),
        );
        drop(collections);

        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn upsert(docs: &mut Vec<Document>, doc: Document) {
    match docs.iter_mut().find(|d| d.id == doc.id) {
        Some(existing) => *existing = doc,
        None => docs.push(doc),
    }
}

/// Equality with numbers compared by value (`5` equals `5.0`).
fn values_equal(stored: &Value, expected: &Value) -> bool {
    match (stored, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a
                .as_f64()
                .zip(b.as_f64())
                .is_some_and(|(x, y)| (x - y).abs() < f64::EPSILON),
        },
        _ => stored == expected,
    }
}
