//! Product catalog.
//!
//! # Architecture
//!
//! - [`normalize`] extracts typed scalars from loosely-shaped documents
//! - [`mapper`] turns one document into a [`safeguard_core::Product`]
//! - [`CatalogRepository`] reads products from a [`crate::store::DocumentStore`]
//! - [`CategoryTreeBuilder`] assembles the navigation tree
//! - [`search`] filters an already-fetched listing
//! - [`ImageResolver`] turns storage paths into download URLs

pub mod images;
pub mod mapper;
pub mod normalize;
pub mod repository;
pub mod sample;
pub mod search;
pub mod tree;

pub use images::ImageResolver;
pub use mapper::map_document;
pub use normalize::extract_field;
pub use repository::{CatalogRepository, FetchStrategy};
pub use search::{VariantOptions, filter_by_navigation, products_of_type, search_products, variant_options};
pub use tree::CategoryTreeBuilder;
