//! Catalog types: products, listing queries and paging arithmetic.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};
use crate::validation::FieldError;

/// A product in the catalog.
///
/// Categories are a plain attribute of the product rather than a separate
/// entity; the set of categories is whatever the products carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Identity, `ProductId::NEW` until stored.
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
}

impl Product {
    /// Check the fields an admin edits, returning one entry per bad field.
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Please enter a product name"));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Please enter a description"));
        }
        if let Err(e) = self.price.check_listed() {
            errors.push(FieldError::new("price", e.form_message()));
        }
        if self.category.trim().is_empty() {
            errors.push(FieldError::new("category", "Please specify a category"));
        }
        errors
    }
}

/// A request for one page of the product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Exact category to filter by, or every category when `None`.
    pub category: Option<String>,
    /// 1-based page number.
    page: u32,
    page_size: u32,
}

impl ProductQuery {
    /// Create a query. Page numbers below 1 are treated as page 1 and a page
    /// size of 0 as 1.
    #[must_use]
    pub fn new(category: Option<String>, page: i64, page_size: u32) -> Self {
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        Self {
            category,
            page,
            page_size: page_size.max(1),
        }
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip before this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    /// Maximum number of rows on this page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// Paging state for a listing, used to render page links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingInfo {
    pub total_items: u64,
    pub items_per_page: u32,
    pub current_page: u32,
}

impl PagingInfo {
    /// Total number of pages; an empty listing still has one (empty) page.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let per_page = u64::from(self.items_per_page.max(1));
        let pages = self.total_items.div_ceil(per_page).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether the current page lies past the end of the listing.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        self.current_page > self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_validation() {
        let product = Product {
            id: ProductId::NEW,
            name: "Kayak".to_string(),
            description: "A boat for one person".to_string(),
            price: Price::from_cents(27500),
            category: "Watersports".to_string(),
        };
        assert!(product.validate().is_empty());

        let blank = Product {
            name: " ".to_string(),
            price: Price::ZERO,
            ..product
        };
        let fields: Vec<&str> = blank.validate().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "price"]);

        let overpriced = Product {
            price: Price::from_cents(10_000_000_000),
            ..blank
        };
        assert_eq!(
            crate::validation::message_for(&overpriced.validate(), "price"),
            Some("Please enter a price of at most $99,999,999.99")
        );
    }

    #[test]
    fn test_query_clamps_page() {
        let query = ProductQuery::new(None, 0, 4);
        assert_eq!(query.page(), 1);
        assert_eq!(query.offset(), 0);

        let query = ProductQuery::new(None, -3, 4);
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_query_offset() {
        let query = ProductQuery::new(Some("Soccer".to_string()), 3, 4);
        assert_eq!(query.offset(), 8);
        assert_eq!(query.limit(), 4);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let paging = PagingInfo {
            total_items: 9,
            items_per_page: 4,
            current_page: 1,
        };
        assert_eq!(paging.total_pages(), 3);
        assert!(!paging.is_out_of_range());
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let paging = PagingInfo {
            total_items: 0,
            items_per_page: 4,
            current_page: 1,
        };
        assert_eq!(paging.total_pages(), 1);
        assert!(!paging.is_out_of_range());
    }

    #[test]
    fn test_page_past_end_is_out_of_range() {
        let paging = PagingInfo {
            total_items: 8,
            items_per_page: 4,
            current_page: 3,
        };
        assert!(paging.is_out_of_range());
    }
}
