//! Catalog product record.

use serde::{Deserialize, Serialize};

use super::category::{Category, ProductType};
use super::id::{DocumentId, ProductId};
use super::price::Price;

/// A product as presented to buyers.
///
/// Built from loosely-shaped store documents; every field has a defined
/// default, so a `Product` always exists for any document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Numeric catalog id (not guaranteed unique).
    pub id: ProductId,
    /// Store document key, the authoritative identity for persistence.
    pub document_id: DocumentId,
    pub name: String,
    /// Display price as stored (e.g. `"120 ₾"`).
    pub price: String,
    /// Numeric unit price used for cart totals.
    pub price_value: Price,
    /// Primary image reference (URL, app path, or storage path).
    pub image: String,
    /// Gallery image references in display order.
    pub images: Vec<String>,
    /// Model code.
    pub model: String,
    pub category: Category,
    /// Raw main-category tag, when the document has one.
    pub main_category: Option<String>,
    pub subcategory: String,
    pub leaf: Option<String>,
    pub color: String,
    pub brand: String,
    pub size: String,
    pub theme: String,
    /// Units on hand. Zero means preorder only.
    pub stock: u32,
    pub material: Option<String>,
    pub description: Option<String>,
    pub features: Option<String>,
    /// Free-form merchandising tag as stored.
    pub product_type: Option<String>,
}

impl Product {
    /// Whether the product can ship immediately.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// The recognized merchandising tag, if the stored one is known.
    #[must_use]
    pub fn product_type_tag(&self) -> Option<ProductType> {
        self.product_type.as_deref().and_then(ProductType::from_tag)
    }
}
