//! Catalog categories, product-type tags, and the navigation tree.

use serde::{Deserialize, Serialize};

/// Top-level product category.
///
/// Documents store this as a lowercase string; anything unrecognized maps
/// to [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Personal protective equipment.
    Ppe,
    /// Rescue and fall-arrest gear.
    Rescue,
    /// Workplace safety (signage, lockout, first aid).
    Workplace,
    #[default]
    Other,
}

impl Category {
    /// All categories in navigation order.
    pub const ALL: [Self; 4] = [Self::Ppe, Self::Rescue, Self::Workplace, Self::Other];

    /// Parse a stored category value, case-insensitively.
    ///
    /// Never fails: unknown or empty values are [`Category::Other`].
    #[must_use]
    pub fn from_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "ppe" => Self::Ppe,
            "rescue" => Self::Rescue,
            "workplace" => Self::Workplace,
            _ => Self::Other,
        }
    }

    /// The stored (wire) form of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ppe => "ppe",
            Self::Rescue => "rescue",
            Self::Workplace => "workplace",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merchandising tag used for home-page rails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Best,
    New,
    Discount,
    Promo,
    Suggest,
}

impl ProductType {
    /// Recognize the spellings that have accumulated in product documents
    /// (`"Best Seller"`, `"bestseller"`, `"new_arrival"`, `"sale"`, ...).
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let key: String = tag
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();

        match key.as_str() {
            "best" | "bestseller" | "bestsellers" | "top" => Some(Self::Best),
            "new" | "newarrival" | "newarrivals" | "novelty" => Some(Self::New),
            "discount" | "discounted" | "sale" => Some(Self::Discount),
            "promo" | "promotion" | "special" => Some(Self::Promo),
            "suggest" | "suggested" | "recommended" | "recommend" => Some(Self::Suggest),
            _ => None,
        }
    }
}

/// A node in the three-level category navigation tree.
///
/// Leaves (no children) are navigable directly; inner nodes expand as
/// filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTreeNode {
    /// Display name.
    pub name: String,
    /// URL-safe identifier.
    pub slug: String,
    /// Icon identifier for the navigation menu.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Child nodes in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl CategoryTreeNode {
    /// Create a leaf node.
    #[must_use]
    pub fn leaf(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            icon: None,
            children: Vec::new(),
        }
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth of the subtree rooted here (a leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }
}
