//! Status enums for stock availability and quote processing.

use serde::{Deserialize, Serialize};

/// Processing status of a quote or special-order request.
///
/// New requests are always written as `Pending`; staff move them forward
/// by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Processed,
    Completed,
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processed => write!(f, "processed"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid quote status: {s}")),
        }
    }
}

/// Availability of a product line, as recorded on a quote item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    /// Source stock was positive when the item was added.
    #[serde(rename = "in stock")]
    InStock,
    /// Source stock was zero; the item is orderable but not on hand.
    #[serde(rename = "preorder")]
    Preorder,
}

impl StockStatus {
    /// Derive the status from a product's stock count.
    #[must_use]
    pub const fn from_stock(stock: u32) -> Self {
        if stock > 0 { Self::InStock } else { Self::Preorder }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "in stock"),
            Self::Preorder => write!(f, "preorder"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_from_stock() {
        assert_eq!(StockStatus::from_stock(0), StockStatus::Preorder);
        assert_eq!(StockStatus::from_stock(3), StockStatus::InStock);
    }

    #[test]
    fn test_stock_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&StockStatus::InStock).unwrap(),
            "\"in stock\""
        );
        assert_eq!(
            serde_json::to_string(&StockStatus::Preorder).unwrap(),
            "\"preorder\""
        );
    }

    #[test]
    fn test_quote_status_roundtrip() {
        for status in [
            QuoteStatus::Pending,
            QuoteStatus::Processed,
            QuoteStatus::Completed,
        ] {
            assert_eq!(status.to_string().parse::<QuoteStatus>().unwrap(), status);
        }
        assert!("archived".parse::<QuoteStatus>().is_err());
    }
}
