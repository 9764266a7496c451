//! Product repository for catalog queries and admin edits.

use rust_decimal::Decimal;
use sqlx::PgPool;

use sportsstore_core::{PagingInfo, Price, Product, ProductId, ProductQuery};

use super::RepositoryError;

/// One page of the product listing plus the paging state to render links.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub paging: PagingInfo,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    category: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Price::new(row.price),
            category: row.category,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one page of products, optionally filtered to a single category.
    ///
    /// Products are ordered by name, then id, so paging is stable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list_page(&self, query: &ProductQuery) -> Result<ProductPage, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, category
            FROM store.product
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY name, id
            OFFSET $2
            LIMIT $3
            ",
        )
        .bind(query.category.as_deref())
        .bind(query.offset())
        .bind(query.limit())
        .fetch_all(self.pool)
        .await?;

        let total_items = self.count(query.category.as_deref()).await?;

        Ok(ProductPage {
            products: rows.into_iter().map(Product::from).collect(),
            paging: PagingInfo {
                total_items,
                items_per_page: query.page_size(),
                current_page: query.page(),
            },
        })
    }

    /// Count products, optionally within one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, category: Option<&str>) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM store.product
            WHERE ($1::text IS NULL OR category = $1)
            ",
        )
        .bind(category)
        .fetch_one(self.pool)
        .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative row count {count}")))
    }

    /// Distinct categories in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let categories = sqlx::query_scalar(
            r"
            SELECT DISTINCT category
            FROM store.product
            ORDER BY category
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Every product, ordered like the listing. Used by the admin area.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, category
            FROM store.product
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, category
            FROM store.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Insert the product when its id is new, otherwise update it in place.
    ///
    /// On insert the generated id is written back into `product`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if a field fails validation.
    /// Returns `RepositoryError::NotFound` if updating an id with no row.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn save(&self, product: &mut Product) -> Result<(), RepositoryError> {
        if let Some(error) = product.validate().first() {
            return Err(RepositoryError::Invalid(format!(
                "{}: {}",
                error.field, error.message
            )));
        }

        if product.id.is_new() {
            let id: ProductId = sqlx::query_scalar(
                r"
                INSERT INTO store.product (name, description, price, category)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                ",
            )
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.amount())
            .bind(&product.category)
            .fetch_one(self.pool)
            .await?;

            product.id = id;
            return Ok(());
        }

        let result = sqlx::query(
            r"
            UPDATE store.product
            SET name = $2, description = $3, price = $4, category = $5
            WHERE id = $1
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(&product.category)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Conflict` if order lines still reference it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, "product"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
