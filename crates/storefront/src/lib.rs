//! Safeguard storefront library.
//!
//! Catalog reads, category navigation, the client-side cart and stock
//! ledgers, quote submission, and the JSON API that serves them. The
//! `safeguard-storefront` binary and `sg-cli` are thin shells over this
//! crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod quotes;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, header},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Build the full application router with its middleware stack.
#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
        )
    });

    routes::routes()
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(trace)
        .layer(cors)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    #[test]
    fn test_manifest_readme_exists() {
        let readme = Path::new(env!("CARGO_MANIFEST_DIR")).join(env!("CARGO_PKG_README"));
        assert!(readme.is_file(), "missing {}", readme.display());
    }
}
