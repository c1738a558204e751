//! # Product Commands
//!
//! Catalog maintenance: list with filters, create, edit, delete.
//!
//! ## Stock Is Not Editable Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_product   quantity field → opening stock (no ledger entry)     │
//! │  update_product   quantity field → ignored                              │
//! │  record_movement  the only way stock changes afterwards                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::DisplayLocale;
use crate::error::ApiResult;
use crate::forms::{ProductFilterForm, ProductForm};
use crate::state::AppState;
use estoque_core::{Product, ProductFilter};

/// Product as shown in the stock table.
///
/// Money appears twice: a machine decimal (`"1234.56"`) for scripts and
/// inputs, and a display string in the configured locale (`"1.234,56"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub contract: Option<String>,
    pub unit: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub unit_value: String,
    pub unit_value_display: String,
    pub stock_value: String,
    pub stock_value_display: String,
    /// Drives the red row highlight.
    pub low_stock: bool,
    pub updated_at: DateTime<Utc>,
}

impl ProductDto {
    pub fn new(product: Product, locale: DisplayLocale) -> ApiResult<Self> {
        let stock_value = product.stock_value()?;
        Ok(ProductDto {
            low_stock: product.is_low_stock(),
            unit_value: product.unit_value.to_string(),
            unit_value_display: locale.format_money(product.unit_value),
            stock_value: stock_value.to_string(),
            stock_value_display: locale.format_money(stock_value),
            id: product.id,
            name: product.name,
            category: product.category,
            contract: product.contract,
            unit: product.unit,
            quantity: product.quantity,
            min_stock: product.min_stock,
            updated_at: product.updated_at,
        })
    }
}

/// The stock page: filtered products plus the values for the filter selectors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListDto {
    pub products: Vec<ProductDto>,
    pub categories: Vec<String>,
    pub contracts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub product_id: i64,
    pub movements_removed: u64,
}

/// Lists products matching the search boxes, ordered by name.
pub async fn list_products(state: &AppState, form: ProductFilterForm) -> ApiResult<ProductListDto> {
    let start = Instant::now();
    let filter = ProductFilter::from(form);
    let locale = state.locale();

    debug!(filter = ?filter, "list_products command");

    let products = state.db().products();
    let rows = products.list(&filter).await?;
    let categories = products.distinct_categories().await?;
    let contracts = products.distinct_contracts().await?;

    let dto = ProductListDto {
        products: rows
            .into_iter()
            .map(|p| ProductDto::new(p, locale))
            .collect::<ApiResult<_>>()?,
        categories: categories.into_iter().collect(),
        contracts: contracts.into_iter().collect(),
    };

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = dto.products.len(),
        "list_products complete"
    );

    Ok(dto)
}

pub async fn get_product(state: &AppState, id: i64) -> ApiResult<ProductDto> {
    debug!(id, "get_product command");
    let product = state.db().products().get(id).await?;
    ProductDto::new(product, state.locale())
}

/// Adds a product. The opening quantity is written without a movement.
pub async fn create_product(state: &AppState, form: ProductForm) -> ApiResult<ProductDto> {
    let input = form.into_new_product()?;
    debug!(name = %input.name, "create_product command");

    let product = state.db().products().create(input).await?;
    info!(id = product.id, name = %product.name, "Product created via command");

    ProductDto::new(product, state.locale())
}

/// Edits catalog fields. The form's quantity is ignored.
pub async fn update_product(state: &AppState, id: i64, form: ProductForm) -> ApiResult<ProductDto> {
    let changes = form.into_update()?;
    debug!(id, name = %changes.name, "update_product command");

    let product = state.db().products().update(id, changes).await?;
    ProductDto::new(product, state.locale())
}

/// Deletes a product together with its movements.
pub async fn delete_product(state: &AppState, id: i64) -> ApiResult<DeleteOutcome> {
    debug!(id, "delete_product command");

    let movements_removed = state.db().products().delete(id).await?;
    info!(id, movements_removed, "Product deleted via command");

    Ok(DeleteOutcome {
        product_id: id,
        movements_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::test_state;

    fn form(name: &str, category: &str, quantity: &str, unit_value: &str) -> ProductForm {
        ProductForm {
            name: name.into(),
            category: category.into(),
            contract: None,
            unit: "unit".into(),
            quantity: quantity.into(),
            unit_value: unit_value.into(),
            min_stock: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let state = test_state().await;

        let created = create_product(&state, form("Cabo", "Elétrica", "1500", "1234,56"))
            .await
            .unwrap();
        assert_eq!(created.quantity, 1500);
        assert_eq!(created.unit_value, "1234.56");
        assert_eq!(created.unit_value_display, "1.234,56");
        assert_eq!(created.stock_value, "1851840.00");
        assert_eq!(created.stock_value_display, "1.851.840,00");
        assert!(!created.low_stock);

        let fetched = get_product(&state, created.id).await.unwrap();
        assert_eq!(fetched, created);

        let missing = get_product(&state, 999).await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let state = test_state().await;

        create_product(&state, form("Gloves", "EPI", "10", "")).await.unwrap();
        let err = create_product(&state, form("Gloves", "EPI", "3", ""))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateName);

        let list = list_products(&state, ProductFilterForm::default()).await.unwrap();
        assert_eq!(list.products.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_form_is_validation_error() {
        let state = test_state().await;

        let err = create_product(&state, form("", "EPI", "1", "")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_product(&state, form("Gloves", "EPI", "-1", "")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_oversized_values_are_rejected_before_insert() {
        let state = test_state().await;

        let err = create_product(&state, form("Turbine", "Energy", "2", "92233720368547758"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("unit_value"), "{}", err.message);

        let err = create_product(&state, form("Turbine", "Energy", "100000001", "1"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Nothing was stored, and reads keep working
        let list = list_products(&state, ProductFilterForm::default()).await.unwrap();
        assert!(list.products.is_empty());

        let largest = create_product(&state, form("Turbine", "Energy", "100000000", "100000000"))
            .await
            .unwrap();
        assert_eq!(largest.stock_value, "10000000000000000.00");
        assert_eq!(get_product(&state, largest.id).await.unwrap(), largest);

        let mut edit = form("Turbine", "Energy", "", "100000000,01");
        edit.min_stock = "1".into();
        let err = update_product(&state, largest.id, edit).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_update_keeps_quantity() {
        let state = test_state().await;
        let created = create_product(&state, form("Bolt", "Hardware", "100", "1.50"))
            .await
            .unwrap();

        let mut edit = form("Bolt M8", "Hardware", "0", "1,75");
        edit.min_stock = "20".into();
        let updated = update_product(&state, created.id, edit).await.unwrap();

        assert_eq!(updated.name, "Bolt M8");
        assert_eq!(updated.quantity, 100);
        assert_eq!(updated.unit_value, "1.75");
        assert_eq!(updated.min_stock, 20);
    }

    #[tokio::test]
    async fn test_list_filters_and_selectors() {
        let state = test_state().await;

        let mut gloves = form("Luvas", "EPI", "10", "");
        gloves.contract = Some("CT-01".into());
        create_product(&state, gloves).await.unwrap();
        create_product(&state, form("Bota", "EPI", "4", "")).await.unwrap();
        create_product(&state, form("Cabo", "Elétrica", "4", "")).await.unwrap();

        let all = list_products(&state, ProductFilterForm::default()).await.unwrap();
        let names: Vec<_> = all.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Bota", "Cabo", "Luvas"]);
        assert_eq!(all.categories, ["EPI", "Elétrica"]);
        assert_eq!(all.contracts, ["CT-01"]);

        let epi = list_products(
            &state,
            ProductFilterForm {
                category: Some("epi".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(epi.products.len(), 2);

        let by_contract = list_products(
            &state,
            ProductFilterForm {
                contract: Some("ct".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_contract.products.len(), 1);
        assert_eq!(by_contract.products[0].name, "Luvas");
    }

    #[tokio::test]
    async fn test_delete() {
        let state = test_state().await;
        let created = create_product(&state, form("Gloves", "EPI", "10", "")).await.unwrap();

        let outcome = delete_product(&state, created.id).await.unwrap();
        assert_eq!(outcome.movements_removed, 0);

        let err = delete_product(&state, created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
