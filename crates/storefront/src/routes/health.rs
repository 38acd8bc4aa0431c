//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode};

use crate::catalog::repository::PRODUCTS;
use crate::state::AppState;
use crate::store::{DocumentStore, Query};

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Probes the document store with a one-document read. Returns 503 when no
/// store is configured or the probe fails.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if !state.backend().is_configured() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    match state.backend().query(&Query::collection(PRODUCTS).limit(1)).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(backend = state.backend().kind(), error = %e, "Readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{empty_state, get_status, sample_state, sample_state_with_store};

    #[tokio::test]
    async fn test_liveness() {
        assert_eq!(get_status(empty_state(), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_tracks_store() {
        assert_eq!(get_status(sample_state(), "/health/ready").await, StatusCode::OK);
        assert_eq!(
            get_status(empty_state(), "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        let (state, store) = sample_state_with_store();
        store.set_unavailable(true);
        assert_eq!(
            get_status(state, "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
