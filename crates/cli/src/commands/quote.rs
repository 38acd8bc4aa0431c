//! Quote and special-order submission.

use safeguard_core::{ContactDetails, QuoteStatus, RequestId, SpecialOrderRequest};
use safeguard_storefront::quotes::QuoteSubmitter;
use tracing::info;

use super::Context;

/// Submit the cart as a quote request and clear it on success.
///
/// On failure the cart is kept so the buyer can retry.
///
/// # Errors
///
/// Returns an error if no store is configured, the contact details or cart
/// are rejected, or the write fails.
#[allow(clippy::print_stdout)]
pub async fn submit(ctx: &Context, contact: &ContactDetails) -> Result<RequestId, Box<dyn std::error::Error>> {
    let submitter = QuoteSubmitter::new(ctx.store()?.clone());
    let mut session = ctx.session();

    let id = submitter.submit(contact, session.cart().items()).await?;
    session.cart_mut().clear();

    info!(%id, "Quote submitted, cart cleared");
    println!("Quote request {id} submitted");
    Ok(id)
}

/// Submit a request for a product the catalog does not carry.
///
/// # Errors
///
/// Returns an error if no store is configured, the request is rejected, or
/// the write fails.
#[allow(clippy::print_stdout)]
pub async fn special_order(
    ctx: &Context,
    contact: ContactDetails,
    description: String,
    quantity: Option<u32>,
) -> Result<RequestId, Box<dyn std::error::Error>> {
    let submitter = QuoteSubmitter::new(ctx.store()?.clone());
    let request = SpecialOrderRequest {
        contact,
        product_description: description,
        quantity,
        status: QuoteStatus::Pending,
        created_at: None,
    };

    let id = submitter.submit_special(&request).await?;
    println!("Special order request {id} submitted");
    Ok(id)
}
