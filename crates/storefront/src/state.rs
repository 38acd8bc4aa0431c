//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{CatalogRepository, CategoryTreeBuilder, ImageResolver};
use crate::config::StorefrontConfig;
use crate::quotes::QuoteSubmitter;
use crate::store::Backend;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog, quote submission, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Backend,
    catalog: CatalogRepository<Backend>,
    categories: CategoryTreeBuilder<Backend>,
    quotes: QuoteSubmitter<Backend>,
    images: ImageResolver,
}

impl AppState {
    /// Create application state, connecting to the configured backend.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = Backend::from_config(&config.backend);
        Self::with_backend(config, backend)
    }

    /// Create application state over an explicit backend.
    #[must_use]
    pub fn with_backend(config: StorefrontConfig, backend: Backend) -> Self {
        let ttl = config.catalog_cache_ttl;

        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogRepository::new(backend.clone(), ttl),
                categories: CategoryTreeBuilder::new(backend.clone(), ttl),
                quotes: QuoteSubmitter::new(backend.clone()),
                images: ImageResolver::new(config.storage.clone()),
                backend,
                config,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the document store backend.
    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogRepository<Backend> {
        &self.inner.catalog
    }

    /// Get a reference to the category tree builder.
    #[must_use]
    pub fn categories(&self) -> &CategoryTreeBuilder<Backend> {
        &self.inner.categories
    }

    /// Get a reference to the quote submitter.
    #[must_use]
    pub fn quotes(&self) -> &QuoteSubmitter<Backend> {
        &self.inner.quotes
    }

    /// Get a reference to the image resolver.
    #[must_use]
    pub fn images(&self) -> &ImageResolver {
        &self.inner.images
    }
}
