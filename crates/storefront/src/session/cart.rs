//! The buyer's cart.

use safeguard_core::{CartItem, Price, ProductId, ProductRef, VariantChoice};
use tracing::{debug, warn};

use super::storage::{CartStorage, CartStorageError};

/// Cart lines plus the storage they are saved to.
///
/// Loaded once on creation; every mutation saves the full list. Storage
/// failures never surface to the buyer: a cart that cannot be loaded starts
/// empty, and a failed save is logged and the in-memory cart kept.
#[derive(Debug)]
pub struct CartLedger<S> {
    storage: S,
    items: Vec<CartItem>,
}

impl<S: CartStorage> CartLedger<S> {
    /// Load the saved cart, or start empty.
    pub fn load(storage: S) -> Self {
        let items = match read_items(&storage) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable saved cart");
                Vec::new()
            }
        };
        debug!(lines = items.len(), "Loaded cart");

        Self { storage, items }
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Add `quantity` units of a product.
    ///
    /// Adding a product already in the cart increases that line's quantity
    /// and keeps its original variant choice. A zero quantity is ignored.
    pub fn add_item(&mut self, product: ProductRef, variant: VariantChoice, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.items.iter_mut().find(|item| item.product.id == product.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(quantity);
            }
            None => self.items.push(CartItem {
                product,
                variant,
                quantity,
            }),
        }
        self.persist();
    }

    /// Set a line's quantity. Zero removes the line; unknown ids are ignored.
    pub fn update_quantity(&mut self, id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|item| item.product.id == id) {
            item.quantity = quantity;
            self.persist();
        }
    }

    /// Remove a line.
    pub fn remove_item(&mut self, id: ProductId) {
        let before = self.items.len();
        self.items.retain(|item| item.product.id != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Total units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.items)
            .map_err(CartStorageError::from)
            .and_then(|json| self.storage.save(&json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to save cart");
        }
    }
}

/// Decode saved lines, dropping empty lines and merging duplicate ids.
fn read_items(storage: &impl CartStorage) -> Result<Vec<CartItem>, CartStorageError> {
    let Some(contents) = storage.load()? else {
        return Ok(Vec::new());
    };
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let saved: Vec<CartItem> = serde_json::from_str(&contents)?;
    Ok(CartItem::consolidate(saved))
}
