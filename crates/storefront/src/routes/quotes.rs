//! Quote and special-order submission handlers.
//!
//! Carts live on the client, so a quote request carries its own snapshot of
//! cart lines.

use axum::{Json, extract::State, http::StatusCode};
use safeguard_core::{CartItem, ContactDetails, RequestId, SpecialOrderRequest};
use serde::{Deserialize, Serialize};

use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Contact fields (camelCase, at the top level) plus the cart lines.
#[derive(Debug, Deserialize)]
pub struct QuoteBody {
    #[serde(flatten)]
    pub contact: ContactDetails,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
pub struct Submitted {
    pub id: RequestId,
}

/// Submit a quote request.
#[tracing::instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<QuoteBody>,
) -> Result<(StatusCode, Json<Submitted>)> {
    let id = state.quotes().submit(&body.contact, &body.items).await?;
    add_breadcrumb("quote", "Quote submitted", Some(&[("request_id", id.as_str())]));
    Ok((StatusCode::CREATED, Json(Submitted { id })))
}

/// Submit a special-order request.
#[tracing::instrument(skip_all)]
pub async fn submit_special(
    State(state): State<AppState>,
    Json(body): Json<SpecialOrderRequest>,
) -> Result<(StatusCode, Json<Submitted>)> {
    let id = state.quotes().submit_special(&body).await?;
    add_breadcrumb("quote", "Special order submitted", Some(&[("request_id", id.as_str())]));
    Ok((StatusCode::CREATED, Json(Submitted { id })))
}
