//! Document store access.
//!
//! # Architecture
//!
//! - The catalog, category tree, and quote layers talk to the store only
//!   through the narrow [`DocumentStore`] trait
//! - Documents are returned with their raw field maps; Firestore's typed
//!   value envelopes (`{"stringValue": ...}`) are passed through untouched
//!   and decoded by the catalog normalizer
//! - Failures are classified into [`StoreError`] variants so callers can
//!   pick a fallback without inspecting messages
//!
//! # Backends
//!
//! - [`FirestoreClient`] - Firestore REST API over `reqwest`
//! - [`MemoryStore`] - in-process collections for tests and demo mode
//! - [`Backend`] - runtime selection between the two (or none)

mod backend;
pub mod firestore;
mod memory;

use std::future::Future;

use safeguard_core::DocumentId;
use serde_json::{Map, Value};
use thiserror::Error;

pub use backend::Backend;
pub use firestore::FirestoreClient;
pub use memory::MemoryStore;

/// Raw field map of a stored document.
pub type Fields = Map<String, Value>;

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No store is configured for this process.
    #[error("document store is not configured")]
    Unavailable,

    /// The query needs an index the store does not have.
    #[error("missing index: {0}")]
    MissingIndex(String),

    /// The caller lacks permission for this operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The store rejected the request for quota or rate reasons.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Any other store-reported failure.
    #[error("backend error ({status}): {message}")]
    Backend {
        /// Store status code or name.
        status: String,
        /// Store-provided message.
        message: String,
    },
}

/// A document read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document key within its collection.
    pub id: DocumentId,
    /// Raw fields.
    pub fields: Fields,
}

impl Document {
    /// Create a document from a key and field map.
    #[must_use]
    pub fn new(id: impl Into<DocumentId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Equality filter on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Field path.
    pub field: String,
    /// Bare JSON value to compare against.
    pub value: Value,
}

/// A collection query.
///
/// Only the shapes the catalog needs are supported: one equality filter,
/// ordering by document key, a limit, and a start-after cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Collection name.
    pub collection: String,
    /// Optional equality filter.
    pub filter: Option<FieldFilter>,
    /// Order results by document key (requires an index when combined with
    /// a filter).
    pub order_by_key: bool,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
    /// Return documents whose key sorts after this one.
    pub start_after: Option<DocumentId>,
}

impl Query {
    /// Query every document in a collection, unordered.
    #[must_use]
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filter: None,
            order_by_key: false,
            limit: None,
            start_after: None,
        }
    }

    /// Add an equality filter.
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Order by document key.
    #[must_use]
    pub const fn ordered_by_key(mut self) -> Self {
        self.order_by_key = true;
        self
    }

    /// Limit the result size.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after the given document key.
    #[must_use]
    pub fn start_after(mut self, key: DocumentId) -> Self {
        self.start_after = Some(key);
        self
    }
}

/// A document to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    /// Bare JSON fields (encoded by the backend as needed).
    pub fields: Fields,
    /// Field to fill with the store's commit time.
    pub server_timestamp: Option<&'static str>,
}

/// Narrow read/write interface to the document store.
///
/// All operations are asynchronous; callers await them and no operation
/// blocks the calling thread.
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by key. `Ok(None)` when it does not exist.
    fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Run a query.
    fn query(&self, query: &Query) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Create a document with a store-assigned key and return the key.
    fn create(
        &self,
        collection: &str,
        document: NewDocument,
    ) -> impl Future<Output = Result<DocumentId, StoreError>> + Send;

    /// Create or replace a document under a known key.
    fn put(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Generate a 20-character alphanumeric document key.
pub(crate) fn generate_document_id() -> DocumentId {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    let key: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect();
    DocumentId::new(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = Query::collection("products")
            .where_eq("category", "ppe")
            .ordered_by_key()
            .limit(10)
            .start_after(DocumentId::new("abc"));

        assert_eq!(query.collection, "products");
        assert_eq!(
            query.filter,
            Some(FieldFilter {
                field: "category".to_string(),
                value: Value::from("ppe"),
            })
        );
        assert!(query.order_by_key);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.start_after, Some(DocumentId::new("abc")));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_document_id();
        let b = generate_document_id();
        assert_eq!(a.as_str().len(), 20);
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Backend {
            status: "INTERNAL".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "backend error (INTERNAL): boom");
    }
}
