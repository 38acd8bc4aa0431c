//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use safeguard_core::{Product, ProductType};
use serde::Deserialize;

use crate::catalog::{VariantOptions, filter_by_navigation, products_of_type, search_products, variant_options};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Listing filters, all optional and combined with AND.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    /// Navigation name: category, main category, subcategory, or leaf.
    pub category: Option<String>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Merchandising tag such as `best` or `new`.
    #[serde(rename = "type")]
    pub product_type: Option<String>,
}

/// List products, optionally filtered.
#[tracing::instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<Product>>> {
    let mut products = state.catalog().fetch_all().await;

    if let Some(category) = query.category.as_deref() {
        products = filter_by_navigation(&products, category);
    }
    if let Some(term) = query.search.as_deref() {
        products = search_products(&products, term);
    }
    if let Some(tag) = query.product_type.as_deref() {
        let product_type = ProductType::from_tag(tag)
            .ok_or_else(|| AppError::BadRequest(format!("unknown product type: {tag}")))?;
        products = products_of_type(&products, product_type);
    }

    Ok(Json(products))
}

/// Show one product by document key or numeric id.
#[tracing::instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    find(&state, &id).await.map(Json)
}

/// Colors, sizes, and themes offered within the product's subcategory.
#[tracing::instrument(skip(state))]
pub async fn variants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VariantOptions>> {
    let product = find(&state, &id).await?;
    let listing = state.catalog().fetch_all().await;
    Ok(Json(variant_options(&listing, &product)))
}

async fn find(state: &AppState, id: &str) -> Result<Product> {
    state
        .catalog()
        .fetch_by_id(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
