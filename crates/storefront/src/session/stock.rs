//! Volatile per-session stock counts.

use std::collections::HashMap;

use safeguard_core::ProductId;

/// Remaining units per product, as seen by this session.
///
/// Counts start from the product's stock the first time it is seen and
/// never go below zero. Nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    remaining: HashMap<ProductId, u32>,
}

impl StockLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a product's stock unless it was already seeded; returns the
    /// current count either way.
    pub fn seed(&mut self, id: ProductId, count: u32) -> u32 {
        *self.remaining.entry(id).or_insert(count)
    }

    /// Remaining units, zero for unseeded products.
    #[must_use]
    pub fn get(&self, id: ProductId) -> u32 {
        self.remaining.get(&id).copied().unwrap_or(0)
    }

    /// Subtract units, stopping at zero; returns what remains.
    pub fn decrease(&mut self, id: ProductId, amount: u32) -> u32 {
        let entry = self.remaining.entry(id).or_insert(0);
        *entry = entry.saturating_sub(amount);
        *entry
    }

    #[must_use]
    pub fn is_seeded(&self, id: ProductId) -> bool {
        self.remaining.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seed_wins() {
        let mut stock = StockLedger::new();
        let id = ProductId::new(1);

        assert_eq!(stock.seed(id, 10), 10);
        assert_eq!(stock.seed(id, 99), 10);
        assert_eq!(stock.get(id), 10);
    }

    #[test]
    fn test_decrease_floors_at_zero() {
        let mut stock = StockLedger::new();
        let id = ProductId::new(1);
        stock.seed(id, 10);

        assert_eq!(stock.decrease(id, 4), 6);
        assert_eq!(stock.decrease(id, 100), 0);
        assert_eq!(stock.get(id), 0);
    }

    #[test]
    fn test_unseeded_is_zero() {
        let stock = StockLedger::new();
        assert_eq!(stock.get(ProductId::new(5)), 0);
        assert!(!stock.is_seeded(ProductId::new(5)));
    }
}
