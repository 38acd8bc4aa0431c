//! Buyer-side state: the cart and the stock it draws from.
//!
//! A [`ShopSession`] is created by whoever serves one buyer (the CLI, a
//! test, an embedding UI) and dropped with them. Adding to the cart and
//! drawing down stock happen together through [`ShopSession::add_to_cart`].

mod cart;
mod stock;
mod storage;

use safeguard_core::{Product, ProductRef, VariantChoice};
use tracing::debug;

pub use cart::CartLedger;
pub use stock::StockLedger;
pub use storage::{CartStorage, CartStorageError, JsonFileStorage, MemoryStorage};

/// Result of [`ShopSession::add_to_cart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// This many units were added (possibly fewer than requested).
    Added { quantity: u32 },
    /// The product ships from stock and none is left.
    OutOfStock,
}

/// One buyer's cart and stock view.
#[derive(Debug)]
pub struct ShopSession<S> {
    cart: CartLedger<S>,
    stock: StockLedger,
}

impl<S: CartStorage> ShopSession<S> {
    /// Start a session, loading the saved cart from `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            cart: CartLedger::load(storage),
            stock: StockLedger::new(),
        }
    }

    /// Add a product to the cart and draw down its stock.
    ///
    /// Products in stock are capped at the units this session has left;
    /// preorder products (stock 0) are never capped.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32, variant: VariantChoice) -> AddOutcome {
        let remaining = self.stock.seed(product.id, product.stock);

        let quantity = if product.in_stock() {
            if remaining == 0 {
                debug!(product_id = %product.id, "No stock left");
                return AddOutcome::OutOfStock;
            }
            quantity.min(remaining)
        } else {
            quantity
        };

        if quantity > 0 {
            self.cart.add_item(ProductRef::from(product), variant, quantity);
            self.stock.decrease(product.id, quantity);
        }
        AddOutcome::Added { quantity }
    }

    #[must_use]
    pub const fn cart(&self) -> &CartLedger<S> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartLedger<S> {
        &mut self.cart
    }

    #[must_use]
    pub const fn stock(&self) -> &StockLedger {
        &self.stock
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use safeguard_core::{DocumentId, ProductId, StockStatus};
    use serde_json::json;

    use super::*;
    use crate::catalog::map_document;

    fn product(id: i64, stock: u32) -> Product {
        map_document(
            DocumentId::new(format!("doc-{id}")),
            json!({ "id": id, "name": "Gloves", "price": "10 ₾", "stock": stock })
                .as_object()
                .unwrap(),
        )
    }

    #[test]
    fn test_add_clamps_to_remaining_stock() {
        let mut session = ShopSession::new(MemoryStorage::new());
        let gloves = product(1, 3);

        assert_eq!(
            session.add_to_cart(&gloves, 2, VariantChoice::default()),
            AddOutcome::Added { quantity: 2 }
        );
        assert_eq!(
            session.add_to_cart(&gloves, 5, VariantChoice::default()),
            AddOutcome::Added { quantity: 1 }
        );
        assert_eq!(
            session.add_to_cart(&gloves, 1, VariantChoice::default()),
            AddOutcome::OutOfStock
        );

        assert_eq!(session.cart().count(), 3);
        assert_eq!(session.stock().get(ProductId::new(1)), 0);
    }

    #[test]
    fn test_preorder_is_unclamped() {
        let mut session = ShopSession::new(MemoryStorage::new());
        let boots = product(2, 0);

        assert_eq!(
            session.add_to_cart(&boots, 40, VariantChoice::default()),
            AddOutcome::Added { quantity: 40 }
        );
        assert_eq!(session.cart().items()[0].stock_status(), StockStatus::Preorder);
    }

    #[test]
    fn test_stock_seed_uses_first_sighting() {
        let mut session = ShopSession::new(MemoryStorage::new());
        session.add_to_cart(&product(3, 10), 4, VariantChoice::default());

        // a later listing reporting more stock does not reset the count
        session.add_to_cart(&product(3, 99), 1, VariantChoice::default());
        assert_eq!(session.stock().get(ProductId::new(3)), 5);
        assert_eq!(session.cart().count(), 5);
    }
}
