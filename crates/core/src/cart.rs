//! The shopping cart.
//!
//! A cart is a plain value: it is deserialized from the session at the start
//! of a request, mutated by the handler and written back. Every line holds a
//! snapshot of the product it was added from and a quantity of at least one;
//! any operation that would leave a line at zero removes it instead.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// One product and quantity in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// A session-scoped collection of cart lines, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `quantity` of a product, merging with an existing line.
    ///
    /// Adding zero is a no-op so a line is never created empty.
    pub fn add_item(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.line_mut(product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine { product, quantity }),
        }
    }

    /// Take `quantity` away from a product's line, removing it at zero.
    ///
    /// Returns the quantity left (0 when the line was removed or absent).
    pub fn reduce_item(&mut self, product_id: ProductId, quantity: u32) -> u32 {
        let Some(line) = self.line_mut(product_id) else {
            return 0;
        };

        line.quantity = line.quantity.saturating_sub(quantity);
        let remaining = line.quantity;
        if remaining == 0 {
            self.remove_line(product_id);
        }
        remaining
    }

    /// Set the quantity of an existing line; zero removes it.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_line(product_id);
        }

        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove the line for a product. Returns whether a line was removed.
    pub fn remove_line(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product.id != product_id);
        self.lines.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of a product currently in the cart (0 when absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product.id == product_id)
            .map_or(0, |line| line.quantity)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total_value(&self) -> Price {
        self.lines.iter().map(CartLine::total).sum()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("P{id}"),
            description: String::new(),
            price: Price::from_cents(cents),
            category: "Test".to_string(),
        }
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 100), 2);
        cart.add_item(product(1, 100), 1);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 3);

        assert!(cart.remove_line(ProductId::new(1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 100), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(product(2, 100), 1);
        cart.add_item(product(1, 100), 1);
        cart.add_item(product(2, 100), 1);

        let ids: Vec<i32> = cart.lines().iter().map(|l| l.product.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_remove_missing_line_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 100), 1);
        assert!(!cart.remove_line(ProductId::new(9)));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_reduce_removes_line_at_zero() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 100), 3);

        assert_eq!(cart.reduce_item(ProductId::new(1), 2), 1);
        assert_eq!(cart.reduce_item(ProductId::new(1), 5), 0);
        assert!(cart.is_empty());
        assert_eq!(cart.reduce_item(ProductId::new(1), 1), 0);
    }

    #[test]
    fn test_net_quantity_over_operation_sequence() {
        let mut cart = Cart::new();
        let ops: [(bool, u32); 7] = [
            (true, 2),
            (true, 3),
            (false, 1),
            (false, 4),
            (true, 1),
            (false, 1),
            (true, 6),
        ];

        let mut expected: i64 = 0;
        for (is_add, qty) in ops {
            if is_add {
                cart.add_item(product(1, 250), qty);
                expected += i64::from(qty);
            } else {
                cart.reduce_item(ProductId::new(1), qty);
                expected = (expected - i64::from(qty)).max(0);
            }

            let actual = i64::from(cart.quantity_of(ProductId::new(1)));
            assert_eq!(actual, expected);
            assert_eq!(cart.lines().is_empty(), expected == 0);
        }
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 100), 1);

        assert!(cart.set_quantity(ProductId::new(1), 4));
        assert_eq!(cart.item_count(), 4);
        assert!(!cart.set_quantity(ProductId::new(2), 4));
        assert!(cart.set_quantity(ProductId::new(1), 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_value() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 27500), 1);
        cart.add_item(product(2, 4895), 2);
        assert_eq!(cart.total_value(), Price::from_cents(37290));
        assert_eq!(cart.item_count(), 3);

        cart.clear();
        assert_eq!(cart.total_value(), Price::ZERO);
    }

    #[test]
    fn test_cart_survives_json_round_trip() {
        let mut cart = Cart::new();
        cart.add_item(product(3, 1995), 2);

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
