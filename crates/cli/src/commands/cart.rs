//! Local cart commands.
//!
//! Each invocation is one shopping session: stock is counted from the
//! catalog's figure for the products touched in that run.

use safeguard_core::{CartItem, ProductId, VariantChoice};
use safeguard_storefront::session::{AddOutcome, CartLedger, CartStorage};
use tracing::{info, warn};

use super::{CliError, Context};

/// Add a product to the cart, capped at the stock on hand.
///
/// # Errors
///
/// Returns [`CliError::ProductNotFound`] when the catalog has no such
/// product.
pub async fn add(
    ctx: &Context,
    product: &str,
    quantity: u32,
    variant: VariantChoice,
) -> Result<AddOutcome, CliError> {
    let product = ctx
        .catalog()
        .fetch_by_id(product)
        .await
        .ok_or_else(|| CliError::ProductNotFound(product.to_string()))?;

    let mut session = ctx.session();
    let outcome = session.add_to_cart(&product, quantity, variant);
    match outcome {
        AddOutcome::Added { quantity: added } if added < quantity => {
            warn!(requested = quantity, added, "Only part of the request is in stock");
        }
        AddOutcome::Added { quantity: added } => info!(added, name = %product.name, "Added to cart"),
        AddOutcome::OutOfStock => warn!(name = %product.name, "Out of stock"),
    }
    Ok(outcome)
}

/// Set a line's quantity; zero removes it.
///
/// # Errors
///
/// Returns [`CliError::NotInCart`] when no line holds the product.
pub fn update(ctx: &Context, product_id: i64, quantity: u32) -> Result<(), CliError> {
    let id = ProductId::new(product_id);
    let mut session = ctx.session();
    ensure_in_cart(session.cart(), id)?;

    session.cart_mut().update_quantity(id, quantity);
    info!(%id, quantity, "Cart line updated");
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns [`CliError::NotInCart`] when no line holds the product.
pub fn remove(ctx: &Context, product_id: i64) -> Result<(), CliError> {
    let id = ProductId::new(product_id);
    let mut session = ctx.session();
    ensure_in_cart(session.cart(), id)?;

    session.cart_mut().remove_item(id);
    info!(%id, "Cart line removed");
    Ok(())
}

/// Print the cart with its total.
#[allow(clippy::print_stdout)]
pub fn list(ctx: &Context) {
    let session = ctx.session();
    let cart = session.cart();
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in cart.items() {
        println!("{}", item_line(item));
    }
    println!("{} items, total {}", cart.count(), cart.total().display());
}

pub fn clear(ctx: &Context) {
    ctx.session().cart_mut().clear();
    info!("Cart cleared");
}

fn ensure_in_cart<S: CartStorage>(cart: &CartLedger<S>, id: ProductId) -> Result<(), CliError> {
    if cart.items().iter().any(|item| item.product.id == id) {
        Ok(())
    } else {
        Err(CliError::NotInCart(id))
    }
}

fn item_line(item: &CartItem) -> String {
    let variant: Vec<&str> = [&item.variant.color, &item.variant.size, &item.variant.theme]
        .into_iter()
        .filter_map(Option::as_deref)
        .collect();
    let variant = if variant.is_empty() {
        String::new()
    } else {
        format!(" ({})", variant.join(", "))
    };

    format!(
        "{:>6}  {}{}  x{}  {}  [{}]",
        item.product.id,
        item.product.name,
        variant,
        item.quantity,
        item.line_total().display(),
        item.stock_status()
    )
}
