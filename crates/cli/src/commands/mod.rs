//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod quote;
pub mod seed;

use std::path::PathBuf;
use std::time::Duration;

use safeguard_core::ProductId;
use safeguard_storefront::catalog::{CatalogRepository, CategoryTreeBuilder};
use safeguard_storefront::config::{ConfigError, StorefrontConfig};
use safeguard_storefront::session::{JsonFileStorage, ShopSession};
use safeguard_storefront::store::Backend;
use thiserror::Error;

/// Command failures that are not store or config errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("no document store configured (set FIRESTORE_PROJECT_ID or STORE_BACKEND=memory)")]
    NoStore,

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// What every command needs: the store and where the cart lives.
pub struct Context {
    backend: Backend,
    cache_ttl: Duration,
    cart_path: PathBuf,
}

impl Context {
    /// Build the context from environment configuration.
    pub fn from_env(cart_path: PathBuf) -> Result<Self, ConfigError> {
        let config = StorefrontConfig::from_env()?;
        let backend = Backend::from_config(&config.backend);
        if matches!(backend, Backend::Memory(_)) {
            tracing::warn!("Memory backend: writes are discarded when the command exits");
        }
        Ok(Self::new(backend, config.catalog_cache_ttl, cart_path))
    }

    pub const fn new(backend: Backend, cache_ttl: Duration, cart_path: PathBuf) -> Self {
        Self {
            backend,
            cache_ttl,
            cart_path,
        }
    }

    /// The backend, or [`CliError::NoStore`] when none is configured.
    pub fn store(&self) -> Result<&Backend, CliError> {
        if self.backend.is_configured() {
            Ok(&self.backend)
        } else {
            Err(CliError::NoStore)
        }
    }

    pub fn catalog(&self) -> CatalogRepository<Backend> {
        CatalogRepository::new(self.backend.clone(), self.cache_ttl)
    }

    pub fn categories(&self) -> CategoryTreeBuilder<Backend> {
        CategoryTreeBuilder::new(self.backend.clone(), self.cache_ttl)
    }

    /// A shopping session over the cart file.
    pub fn session(&self) -> ShopSession<JsonFileStorage> {
        ShopSession::new(JsonFileStorage::new(&self.cart_path))
    }
}
