//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (probes the store)
//!
//! # Catalog
//! GET  /api/products                 - Product listing (?category=&search=&type=)
//! GET  /api/products/{id}            - Product by document key or numeric id
//! GET  /api/products/{id}/variants   - Variant options within the subcategory
//! GET  /api/categories               - Navigation tree
//! GET  /api/images                   - Resolve an image reference (?ref=)
//!
//! # Requests
//! POST /api/quotes                   - Submit a quote for a cart snapshot
//! POST /api/special-quotes           - Submit a special-order request
//! ```

pub mod categories;
pub mod health;
pub mod images;
pub mod products;
pub mod quotes;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/variants", get(products::variants))
        .route("/categories", get(categories::tree))
        .route("/images", get(images::resolve))
        .route("/quotes", post(quotes::submit))
        .route("/special-quotes", post(quotes::submit_special))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::config::StorefrontConfig;
    use crate::state::AppState;
    use crate::store::{Backend, Fields, MemoryStore};

    fn fields(value: Value) -> Fields {
        value.as_object().unwrap().clone()
    }

    fn config() -> StorefrontConfig {
        StorefrontConfig::from_lookup(|_| None).unwrap()
    }

    /// State over a store with no configured backend.
    pub fn empty_state() -> AppState {
        AppState::with_backend(config(), Backend::Unconfigured)
    }

    /// State over a small catalog: two gloves and a harness, one main
    /// category with one subcategory.
    pub fn sample_state_with_store() -> (AppState, MemoryStore) {
        let store = MemoryStore::new();
        store.insert(
            "products",
            "g1",
            fields(json!({
                "id": 1, "name": "Nitrile Gloves", "price": "12 ₾", "category": "ppe",
                "subcategory": "Gloves", "color": "blue", "size": "L", "stock": 40,
                "productType": "Best Seller"
            })),
        );
        store.insert(
            "products",
            "g2",
            fields(json!({
                "id": 2, "name": "Latex Gloves", "price": "9 ₾", "category": "ppe",
                "subcategory": "Gloves", "color": "white", "size": "L", "stock": 0
            })),
        );
        store.insert(
            "products",
            "h1",
            fields(json!({
                "id": 3, "name": "Safety Harness", "price": "240 ₾", "category": "rescue",
                "subcategory": "Harnesses", "color": "yellow", "stock": 5
            })),
        );
        store.insert(
            "main_categories",
            "ppe",
            fields(json!({ "name": "PPE", "order": 1, "icon": "shield" })),
        );
        store.insert(
            "subcategories",
            "gloves",
            fields(json!({ "name": "Gloves", "mainCategory": "PPE", "order": 1 })),
        );

        let state = AppState::with_backend(config(), Backend::Memory(store.clone()));
        (state, store)
    }

    pub fn sample_state() -> AppState {
        sample_state_with_store().0
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = crate::app(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
        send(state, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn get_status(state: AppState, uri: &str) -> StatusCode {
        get(state, uri).await.0
    }

    pub async fn post_json(state: AppState, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(state, request).await
    }
}
