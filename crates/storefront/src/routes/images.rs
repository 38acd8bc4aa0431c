//! Image reference resolution.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolvedImage {
    pub url: String,
}

/// Turn a storage path into a loadable URL. Unresolvable references come
/// back unchanged.
#[tracing::instrument(skip(state))]
pub async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Json<ResolvedImage>> {
    let reference = query
        .reference
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("ref is required".to_string()))?;

    let url = state.images().resolve(&reference).await;
    Ok(Json(ResolvedImage { url }))
}
