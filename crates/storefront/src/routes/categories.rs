//! Category navigation handler.

use axum::{Json, extract::State};
use safeguard_core::CategoryTreeNode;

use crate::state::AppState;

/// The full navigation tree. Empty when no category documents exist.
#[tracing::instrument(skip(state))]
pub async fn tree(State(state): State<AppState>) -> Json<Vec<CategoryTreeNode>> {
    Json(state.categories().build_tree().await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{empty_state, get, sample_state};

    #[tokio::test]
    async fn test_tree_links_subcategories() {
        let (status, body) = get(sample_state(), "/api/categories").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], json!("PPE"));
        assert_eq!(body[0]["icon"], json!("shield"));
        assert_eq!(body[0]["children"][0]["name"], json!("Gloves"));
        assert_eq!(body[0]["children"][0]["icon"], json!("hand"));
    }

    #[tokio::test]
    async fn test_unconfigured_store_gives_empty_tree() {
        let (status, body) = get(empty_state(), "/api/categories").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
