//! Product reads.
//!
//! Reads never fail from the caller's point of view: store errors are logged
//! and turned into "nothing found", because a storefront with an empty
//! listing is better than an error page.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use safeguard_core::{Category, DocumentId, Product};
use tracing::{debug, instrument, warn};

use super::mapper::{map_document, map_documents};
use crate::store::{Document, DocumentStore, Query, StoreError};

/// Product collection name.
pub const PRODUCTS: &str = "products";

/// Page size for ordered paging; also the threshold above which an
/// unordered scan is suspected to be truncated.
pub const BATCH_SIZE: usize = 1000;

const ALL_PRODUCTS_KEY: &str = "products:all";

/// How `fetch_all` walks the product collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Pages ordered by document key, resuming after the last key seen,
    /// until a short page.
    OrderedPaging { batch_size: usize },
    /// One unordered read of the whole collection.
    UnorderedScan,
}

impl Default for FetchStrategy {
    fn default() -> Self {
        Self::OrderedPaging {
            batch_size: BATCH_SIZE,
        }
    }
}

/// Read access to the product catalog.
///
/// Cheaply cloneable via `Arc`. `fetch_all` results are cached.
pub struct CatalogRepository<S> {
    inner: Arc<RepositoryInner<S>>,
}

impl<S> Clone for CatalogRepository<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct RepositoryInner<S> {
    store: S,
    strategy: FetchStrategy,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl<S: DocumentStore> CatalogRepository<S> {
    /// Create a repository that caches the full listing for `ttl`.
    #[must_use]
    pub fn new(store: S, ttl: Duration) -> Self {
        Self::with_strategy(store, ttl, FetchStrategy::default())
    }

    /// Create a repository with an explicit primary fetch strategy.
    #[must_use]
    pub fn with_strategy(store: S, ttl: Duration, strategy: FetchStrategy) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(RepositoryInner {
                store,
                strategy,
                cache,
            }),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Every product in the catalog.
    ///
    /// Uses the primary strategy, falling back to an unordered scan when the
    /// store lacks the index that ordered paging needs. Any other failure is
    /// logged and yields an empty list (which is not cached).
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Vec<Product> {
        if let Some(products) = self.inner.cache.get(&ALL_PRODUCTS_KEY).await {
            debug!("Cache hit for product listing");
            return products.as_ref().clone();
        }

        let documents = match self.fetch_with(self.inner.strategy).await {
            Ok(documents) => documents,
            Err(StoreError::MissingIndex(message)) => {
                warn!(%message, "Ordered paging unavailable, falling back to unordered scan");
                match self.fetch_with(FetchStrategy::UnorderedScan).await {
                    Ok(documents) => documents,
                    Err(e) => {
                        warn!(error = %e, "Unordered product scan failed");
                        return Vec::new();
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch products");
                return Vec::new();
            }
        };

        let products = Arc::new(map_documents(documents));
        debug!(count = products.len(), "Fetched product listing");
        self.inner
            .cache
            .insert(ALL_PRODUCTS_KEY, Arc::clone(&products))
            .await;

        Arc::unwrap_or_clone(products)
    }

    /// Run one fetch strategy to completion.
    async fn fetch_with(&self, strategy: FetchStrategy) -> Result<Vec<Document>, StoreError> {
        match strategy {
            FetchStrategy::OrderedPaging { batch_size } => self.page_ordered(batch_size.max(1)).await,
            FetchStrategy::UnorderedScan => {
                let documents = self.inner.store.query(&Query::collection(PRODUCTS)).await?;
                if documents.len() >= BATCH_SIZE {
                    warn!(
                        count = documents.len(),
                        "Unordered product scan hit the batch limit; listing may be truncated"
                    );
                }
                Ok(documents)
            }
        }
    }

    async fn page_ordered(&self, batch_size: usize) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();
        let mut cursor: Option<DocumentId> = None;

        loop {
            let mut query = Query::collection(PRODUCTS)
                .ordered_by_key()
                .limit(batch_size);
            if let Some(after) = cursor.take() {
                query = query.start_after(after);
            }

            let page = self.inner.store.query(&query).await?;
            let page_len = page.len();
            cursor = page.last().map(|doc| doc.id.clone());
            documents.extend(page);

            debug!(page_len, total = documents.len(), "Fetched product page");
            if page_len < batch_size {
                return Ok(documents);
            }
        }
    }

    /// Look up one product by document key, then by numeric `id` field.
    #[instrument(skip(self))]
    pub async fn fetch_by_id(&self, id: &str) -> Option<Product> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }

        match self.inner.store.get(PRODUCTS, &DocumentId::new(id)).await {
            Ok(Some(doc)) => return Some(map_document(doc.id, &doc.fields)),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Product key lookup failed"),
        }

        let numeric: i64 = id.parse().ok()?;
        let query = Query::collection(PRODUCTS).where_eq("id", numeric).limit(1);
        match self.inner.store.query(&query).await {
            Ok(docs) => docs
                .into_iter()
                .next()
                .map(|doc| map_document(doc.id, &doc.fields)),
            Err(e) => {
                warn!(error = %e, "Product numeric id lookup failed");
                None
            }
        }
    }

    /// Products whose stored `category` equals the given one.
    #[instrument(skip(self))]
    pub async fn fetch_by_category(&self, category: Category) -> Vec<Product> {
        let query = Query::collection(PRODUCTS).where_eq("category", category.as_str());
        match self.inner.store.query(&query).await {
            Ok(docs) => map_documents(docs),
            Err(e) => {
                warn!(error = %e, "Failed to fetch products by category");
                Vec::new()
            }
        }
    }

    /// Drop the cached listing.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use safeguard_core::ProductId;
    use serde_json::{Value, json};
    use tracing::{Event, Level, Subscriber, field::Field, field::Visit};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    use super::*;
    use crate::store::{Fields, MemoryStore};

    /// Collects the messages of WARN events.
    #[derive(Clone, Default)]
    struct WarningCapture {
        messages: Arc<Mutex<Vec<String>>>,
    }

    struct MessageVisitor<'a>(&'a mut String);

    impl Visit for MessageVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for WarningCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() != Level::WARN {
                return;
            }
            let mut message = String::new();
            event.record(&mut MessageVisitor(&mut message));
            self.messages.lock().unwrap().push(message);
        }
    }

    const TTL: Duration = Duration::from_secs(300);

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn store_with(count: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..count {
            store.insert(
                PRODUCTS,
                format!("doc-{i:04}"),
                fields(json!({ "id": i, "name": format!("Product {i}"), "category": "ppe" })),
            );
        }
        store
    }

    fn paged(store: MemoryStore, batch_size: usize) -> CatalogRepository<MemoryStore> {
        CatalogRepository::with_strategy(store, TTL, FetchStrategy::OrderedPaging { batch_size })
    }

    #[tokio::test]
    async fn test_fetch_all_pages_until_short_batch() {
        let store = store_with(5);
        let repo = paged(store.clone(), 2);

        let products = repo.fetch_all().await;
        assert_eq!(products.len(), 5);
        assert_eq!(products[0].document_id.as_str(), "doc-0000");
        assert_eq!(products[4].document_id.as_str(), "doc-0004");
        // pages of 2, 2, 1
        assert_eq!(store.query_count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_exact_multiple_needs_empty_page() {
        let store = store_with(4);
        let repo = paged(store.clone(), 2);

        assert_eq!(repo.fetch_all().await.len(), 4);
        assert_eq!(store.query_count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_falls_back_on_missing_index() {
        let store = store_with(3);
        store.set_missing_key_index(true);
        let repo = CatalogRepository::new(store.clone(), TTL);

        let products = repo.fetch_all().await;
        assert_eq!(products.len(), 3);
        assert_eq!(store.query_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_all_fallback_over_limit_still_returns_everything() {
        let store = store_with(BATCH_SIZE + 5);
        store.set_missing_key_index(true);
        let repo = CatalogRepository::new(store, TTL);

        assert_eq!(repo.fetch_all().await.len(), BATCH_SIZE + 5);
    }

    #[tokio::test]
    async fn test_fallback_scan_at_batch_limit_warns_of_truncation() {
        let capture = WarningCapture::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));
        tracing::callsite::rebuild_interest_cache();

        let store = store_with(BATCH_SIZE);
        store.set_missing_key_index(true);
        let repo = CatalogRepository::new(store, TTL);
        assert_eq!(repo.fetch_all().await.len(), BATCH_SIZE);

        let messages = capture.messages.lock().unwrap();
        assert!(messages.iter().any(|m| m.contains("may be truncated")), "{messages:?}");
    }

    #[tokio::test]
    async fn test_fallback_scan_below_batch_limit_does_not_warn_of_truncation() {
        let capture = WarningCapture::default();
        let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));
        tracing::callsite::rebuild_interest_cache();

        let store = store_with(BATCH_SIZE - 1);
        store.set_missing_key_index(true);
        let repo = CatalogRepository::new(store, TTL);
        assert_eq!(repo.fetch_all().await.len(), BATCH_SIZE - 1);

        let messages = capture.messages.lock().unwrap();
        assert!(!messages.iter().any(|m| m.contains("may be truncated")), "{messages:?}");
    }

    #[tokio::test]
    async fn test_fetch_all_other_errors_yield_empty_and_skip_cache() {
        let store = store_with(3);
        store.set_unavailable(true);
        let repo = CatalogRepository::new(store.clone(), TTL);

        assert!(repo.fetch_all().await.is_empty());

        store.set_unavailable(false);
        assert_eq!(repo.fetch_all().await.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_is_cached() {
        let store = store_with(3);
        let repo = CatalogRepository::new(store.clone(), TTL);

        repo.fetch_all().await;
        let queries = store.query_count();
        repo.fetch_all().await;
        assert_eq!(store.query_count(), queries);

        repo.invalidate().await;
        repo.fetch_all().await;
        assert!(store.query_count() > queries);
    }

    #[tokio::test]
    async fn test_fetch_by_id_document_key() {
        let repo = CatalogRepository::new(store_with(3), TTL);
        let product = repo.fetch_by_id("doc-0001").await.unwrap();
        assert_eq!(product.id, ProductId::new(1));
    }

    #[tokio::test]
    async fn test_fetch_by_id_numeric_fallback() {
        let store = MemoryStore::new();
        store.insert(PRODUCTS, "x9", fields(json!({ "id": 42, "name": "Harness" })));
        let repo = CatalogRepository::new(store, TTL);

        let product = repo.fetch_by_id("42").await.unwrap();
        assert_eq!(product.document_id.as_str(), "x9");
        assert_eq!(product.name, "Harness");
    }

    #[tokio::test]
    async fn test_fetch_by_id_absent() {
        let repo = CatalogRepository::new(store_with(2), TTL);
        assert!(repo.fetch_by_id("77").await.is_none());
        assert!(repo.fetch_by_id("nope").await.is_none());
        assert!(repo.fetch_by_id("  ").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_by_category() {
        let store = store_with(2);
        store.insert(PRODUCTS, "r1", fields(json!({ "category": "rescue" })));
        let repo = CatalogRepository::new(store.clone(), TTL);

        assert_eq!(repo.fetch_by_category(Category::Ppe).await.len(), 2);
        assert_eq!(repo.fetch_by_category(Category::Rescue).await.len(), 1);
        assert!(repo.fetch_by_category(Category::Workplace).await.is_empty());

        store.set_unavailable(true);
        assert!(repo.fetch_by_category(Category::Ppe).await.is_empty());
    }
}
