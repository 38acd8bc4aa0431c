//! Runtime selection of the document store.

use safeguard_core::DocumentId;

use super::{Document, DocumentStore, Fields, FirestoreClient, MemoryStore, NewDocument, Query, StoreError};
use crate::catalog::sample;
use crate::config::BackendConfig;

/// The document store chosen at startup.
#[derive(Clone)]
pub enum Backend {
    /// Firestore REST API.
    Firestore(FirestoreClient),
    /// In-process store.
    Memory(MemoryStore),
    /// Nothing configured; every operation fails with
    /// [`StoreError::Unavailable`].
    Unconfigured,
}

impl Backend {
    /// Build the backend described by configuration.
    ///
    /// The memory backend starts seeded with the sample catalog so the
    /// storefront is browsable without credentials.
    #[must_use]
    pub fn from_config(config: &BackendConfig) -> Self {
        match config {
            BackendConfig::Firestore(firestore) => Self::Firestore(FirestoreClient::new(firestore)),
            BackendConfig::Memory => {
                let store = MemoryStore::new();
                sample::seed_memory(&store, sample::DEFAULT_COUNT);
                Self::Memory(store)
            }
            BackendConfig::Unconfigured => Self::Unconfigured,
        }
    }

    /// Short name for logs and health output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Firestore(_) => "firestore",
            Self::Memory(_) => "memory",
            Self::Unconfigured => "unconfigured",
        }
    }

    /// Whether a store is configured at all.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !matches!(self, Self::Unconfigured)
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

impl DocumentStore for Backend {
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        match self {
            Self::Firestore(client) => client.get(collection, id).await,
            Self::Memory(store) => store.get(collection, id).await,
            Self::Unconfigured => Err(StoreError::Unavailable),
        }
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Firestore(client) => client.query(query).await,
            Self::Memory(store) => store.query(query).await,
            Self::Unconfigured => Err(StoreError::Unavailable),
        }
    }

    async fn create(&self, collection: &str, document: NewDocument) -> Result<DocumentId, StoreError> {
        match self {
            Self::Firestore(client) => client.create(collection, document).await,
            Self::Memory(store) => store.create(collection, document).await,
            Self::Unconfigured => Err(StoreError::Unavailable),
        }
    }

    async fn put(&self, collection: &str, id: &DocumentId, fields: Fields) -> Result<(), StoreError> {
        match self {
            Self::Firestore(client) => client.put(collection, id, fields).await,
            Self::Memory(store) => store.put(collection, id, fields).await,
            Self::Unconfigured => Err(StoreError::Unavailable),
        }
    }
}
