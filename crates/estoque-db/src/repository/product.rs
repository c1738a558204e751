//! # Product Repository
//!
//! Catalog operations: create, edit, delete, search.
//!
//! ## Who Writes `quantity`
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create()          sets quantity = initial_quantity (no ledger entry)  │
//! │  update()          never touches quantity                              │
//! │  MovementRepository::record()   the only routine stock writer          │
//! │  MovementRepository::repair()   maintenance reset to the ledger value  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Search
//! Filters are case-insensitive substring matches. SQLite's `LIKE` only
//! folds ASCII, so rows are loaded in name order and matched in Rust with
//! Unicode lowercase folding ([`ProductFilter::matches`]).

use std::collections::BTreeSet;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::PRODUCT_COLUMNS;
use estoque_core::{CoreError, NewProduct, Product, ProductFilter, ProductUpdate};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let gloves = repo.create(NewProduct::new("Gloves", "EPI", "pair").with_quantity(10)).await?;
/// let found = repo.list(&ProductFilter { name_contains: Some("glo".into()), ..Default::default() }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// The opening quantity is written straight to the row and also kept as
    /// `initial_quantity`; it does not create a movement.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its generated id
    /// * `Err(DbError::Core(DuplicateName))` - Name already exists
    /// * `Err(DbError::Core(Validation))` - Blank or negative fields
    pub async fn create(&self, input: NewProduct) -> DbResult<Product> {
        let input = input.validate()?;
        debug!(name = %input.name, quantity = input.quantity, "Creating product");

        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO products (
                name, category, contract, unit,
                quantity, initial_quantity, unit_value, min_stock,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?5, ?6, ?7,
                ?8, ?8
            )
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.contract)
            .bind(&input.unit)
            .bind(input.quantity)
            .bind(input.unit_value)
            .bind(input.min_stock)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| name_conflict(e, &input.name))?;

        info!(id = product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by id, failing with `ProductNotFound` when absent.
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::product_not_found(id))
    }

    /// Updates the catalog fields of a product.
    ///
    /// Renaming to the product's own current name is allowed; renaming to
    /// another product's name fails with `DuplicateName`.
    pub async fn update(&self, id: i64, changes: ProductUpdate) -> DbResult<Product> {
        let changes = changes.validate()?;
        debug!(id, name = %changes.name, "Updating product");

        let now = Utc::now();
        let sql = format!(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                contract = ?4,
                unit = ?5,
                unit_value = ?6,
                min_stock = ?7,
                updated_at = ?8
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.category)
            .bind(&changes.contract)
            .bind(&changes.unit)
            .bind(changes.unit_value)
            .bind(changes.min_stock)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| name_conflict(e, &changes.name))?
            .ok_or_else(|| DbError::product_not_found(id))?;

        info!(id, name = %product.name, "Product updated");
        Ok(product)
    }

    /// Deletes a product and every movement that references it.
    ///
    /// Both deletes run in one transaction; an error leaves both tables
    /// untouched.
    ///
    /// ## Returns
    /// The number of movements removed with the product.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        let movements = sqlx::query("DELETE FROM movements WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Dropping the transaction rolls it back
            return Err(DbError::product_not_found(id));
        }

        tx.commit().await?;

        info!(id, movements, "Product deleted");
        Ok(movements)
    }

    /// Lists products matching the filter, sorted by name.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id");

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        if filter.is_empty() {
            return Ok(products);
        }

        let matched: Vec<Product> = products.into_iter().filter(|p| filter.matches(p)).collect();
        debug!(count = matched.len(), "Product filter matched");
        Ok(matched)
    }

    /// Every category in use, sorted.
    pub async fn distinct_categories(&self) -> DbResult<BTreeSet<String>> {
        let categories: Vec<String> = sqlx::query_scalar("SELECT DISTINCT category FROM products")
            .fetch_all(&self.pool)
            .await?;

        Ok(categories.into_iter().collect())
    }

    /// Every non-empty contract in use, sorted.
    pub async fn distinct_contracts(&self) -> DbResult<BTreeSet<String>> {
        let contracts: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT contract FROM products WHERE contract IS NOT NULL AND TRIM(contract) <> ''",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(contracts.into_iter().collect())
    }

    /// Counts products (for diagnostics and the seed guard).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Turns a UNIQUE violation on `products.name` into `DuplicateName`.
fn name_conflict(err: sqlx::Error, name: &str) -> DbError {
    let err = DbError::from(err);
    if err.is_unique_violation_on("products.name") {
        CoreError::DuplicateName(name.to_string()).into()
    } else {
        err
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
