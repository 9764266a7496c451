//! The order aggregate.
//!
//! An order is built from the cart at checkout. Its lines reference products
//! that already exist in the catalog; saving an order never writes product
//! rows.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::Product;
use crate::types::{OrderId, Price};
use crate::validation::FieldError;

/// Shipping and customer details captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: Option<String>,
    pub country: String,
    pub gift_wrap: bool,
}

impl ShippingDetails {
    /// Check the required fields, returning one entry per blank field.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<FieldError> {
        let required = [
            ("name", self.name.as_str(), "Please enter a name"),
            ("line1", self.line1.as_str(), "Please enter the first address line"),
            ("city", self.city.as_str(), "Please enter a city name"),
            ("state", self.state.as_str(), "Please enter a state name"),
            ("country", self.country.as_str(), "Please enter a country name"),
        ];

        required
            .into_iter()
            .filter(|(_, value, _)| value.trim().is_empty())
            .map(|(field, _, message)| FieldError::new(field, message))
            .collect()
    }
}

/// A product and quantity within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: Product,
    pub quantity: u32,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// `OrderId::NEW` until the order has been saved.
    pub id: OrderId,
    pub lines: Vec<OrderLine>,
    pub shipping: ShippingDetails,
    pub shipped: bool,
}

impl Order {
    /// Build a new, unsaved order from the cart's current lines.
    #[must_use]
    pub fn from_cart(cart: &Cart, shipping: ShippingDetails) -> Self {
        Self {
            id: OrderId::NEW,
            lines: cart
                .lines()
                .iter()
                .map(|line| OrderLine {
                    product: line.product.clone(),
                    quantity: line.quantity,
                })
                .collect(),
            shipping,
            shipped: false,
        }
    }

    /// Whether this order still needs to be inserted.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.id.is_new()
    }

    /// Sum of unit price times quantity over every line.
    #[must_use]
    pub fn total_value(&self) -> Price {
        self.lines
            .iter()
            .map(|line| line.product.price * line.quantity)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn kayak() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Kayak".to_string(),
            description: "A boat for one person".to_string(),
            price: Price::from_cents(27500),
            category: "Watersports".to_string(),
        }
    }

    fn address() -> ShippingDetails {
        ShippingDetails {
            name: "Joe".to_string(),
            line1: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            country: "USA".to_string(),
            ..ShippingDetails::default()
        }
    }

    #[test]
    fn test_from_cart_copies_lines() {
        let mut cart = Cart::new();
        cart.add_item(kayak(), 2);

        let order = Order::from_cart(&cart, address());
        assert!(order.is_new());
        assert!(!order.shipped);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines.first().map(|l| l.quantity), Some(2));
        assert_eq!(order.total_value(), Price::from_cents(55000));
    }

    #[test]
    fn test_complete_address_has_no_missing_fields() {
        assert!(address().missing_fields().is_empty());
    }

    #[test]
    fn test_blank_fields_are_reported() {
        let details = ShippingDetails {
            city: "   ".to_string(),
            ..address()
        };
        let missing = details.missing_fields();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing.first().map(|m| m.field), Some("city"));

        assert_eq!(ShippingDetails::default().missing_fields().len(), 5);
    }
}
