//! Cart line items.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;
use super::status::StockStatus;

/// The slice of a product a cart line needs to render and be quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    /// Display price as stored on the product.
    pub price: String,
    /// Numeric unit price.
    pub unit_price: Price,
    pub image: String,
    pub model: String,
    /// Product stock at the moment the line was added.
    #[serde(default)]
    pub stock: u32,
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price.clone(),
            unit_price: product.price_value,
            image: product.image.clone(),
            model: product.model.clone(),
            stock: product.stock,
        }
    }
}

/// Variant attributes the buyer picked for a line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// One cart line. A cart holds at most one line per product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductRef,
    #[serde(default)]
    pub variant: VariantChoice,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.unit_price.times(self.quantity)
    }

    /// Availability derived from the stock recorded when the line was added.
    #[must_use]
    pub const fn stock_status(&self) -> StockStatus {
        StockStatus::from_stock(self.product.stock)
    }

    /// Restore the cart invariants on lines from an untrusted source.
    ///
    /// Zero-quantity lines are dropped. Lines sharing a product id are merged
    /// into the first one, which keeps its variant.
    #[must_use]
    pub fn consolidate(lines: impl IntoIterator<Item = Self>) -> Vec<Self> {
        let mut items: Vec<Self> = Vec::new();
        for line in lines.into_iter().filter(|line| line.quantity > 0) {
            match items.iter_mut().find(|i| i.product.id == line.product.id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
                None => items.push(line),
            }
        }
        items
    }
}
