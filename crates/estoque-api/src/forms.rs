//! Raw request fields → typed inputs.
//!
//! Every field arrives as the string the browser posted. Parsing happens
//! here and nowhere else:
//!
//! | Field            | Accepted                                   | Error            |
//! |------------------|--------------------------------------------|------------------|
//! | movement qty     | positive whole number                      | InvalidQuantity  |
//! | stock / min      | whole number ≥ 0, blank = 0                | Validation       |
//! | unit value       | `1.50` or `1,50`, blank = 0                | Validation       |
//! | movement type    | `Entrada`/`Saída`/`inbound`/`outbound`     | Validation       |
//! | dates            | `YYYY-MM-DD`, blank = no bound             | Validation       |

use estoque_core::validation::{
    blank_to_none, parse_count, parse_movement_type, parse_optional_date, parse_optional_id,
    parse_quantity,
};
use estoque_core::{
    CoreError, CoreResult, Money, MovementFilter, NewMovement, NewProduct, ProductFilter,
    ProductUpdate,
};
use serde::Deserialize;

/// Create/edit product form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub contract: Option<String>,
    pub unit: String,
    /// Opening stock. Ignored on edit.
    pub quantity: String,
    pub unit_value: String,
    pub min_stock: String,
}

impl ProductForm {
    pub fn into_new_product(self) -> CoreResult<NewProduct> {
        let mut product = NewProduct::new(self.name, self.category, self.unit)
            .with_quantity(parse_count("quantity", &self.quantity)?)
            .with_unit_value(parse_unit_value(&self.unit_value)?)
            .with_min_stock(parse_count("min_stock", &self.min_stock)?);
        if let Some(contract) = blank_to_none(self.contract.as_deref()) {
            product = product.with_contract(contract);
        }
        product.validate()
    }

    pub fn into_update(self) -> CoreResult<ProductUpdate> {
        ProductUpdate {
            unit_value: parse_unit_value(&self.unit_value)?,
            min_stock: parse_count("min_stock", &self.min_stock)?,
            contract: blank_to_none(self.contract.as_deref()),
            name: self.name,
            category: self.category,
            unit: self.unit,
        }
        .validate()
    }
}

fn parse_unit_value(raw: &str) -> CoreResult<Money> {
    if raw.trim().is_empty() {
        return Ok(Money::zero());
    }
    Ok(Money::parse("unit_value", raw)?)
}

/// Movement form. `type` is the HTML field name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovementForm {
    pub product_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: String,
    pub responsible: String,
    pub note: Option<String>,
}

impl MovementForm {
    pub fn into_new_movement(self) -> CoreResult<NewMovement> {
        let product_id = parse_optional_id("product_id", Some(self.product_id.as_str()))?
            .ok_or_else(|| estoque_core::ValidationError::Required {
                field: "product_id".to_string(),
            })?;
        let kind = parse_movement_type(&self.kind)?;
        let quantity = parse_quantity("quantity", &self.quantity)?;

        let mut movement = NewMovement::new(product_id, kind, quantity, self.responsible);
        if let Some(note) = blank_to_none(self.note.as_deref()) {
            movement = movement.with_note(note);
        }
        movement.validate()
    }
}

/// Product list search box values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductFilterForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub contract: Option<String>,
}

impl From<ProductFilterForm> for ProductFilter {
    fn from(form: ProductFilterForm) -> Self {
        ProductFilter {
            name_contains: blank_to_none(form.name.as_deref()),
            category_contains: blank_to_none(form.category.as_deref()),
            contract_contains: blank_to_none(form.contract.as_deref()),
        }
    }
}

/// Movement report filters. Every field may be blank.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportFilterForm {
    pub product_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl ReportFilterForm {
    pub fn into_filter(self) -> CoreResult<MovementFilter> {
        let kind = blank_to_none(self.kind.as_deref())
            .map(|raw| parse_movement_type(&raw))
            .transpose()?;

        let filter = MovementFilter {
            product_id: parse_optional_id("product_id", self.product_id.as_deref())?,
            kind,
            date_from: parse_optional_date("date_from", self.date_from.as_deref())?,
            date_to: parse_optional_date("date_to", self.date_to.as_deref())?,
        };

        // Surfaces an inverted range before any query runs
        filter.time_bounds()?;
        Ok(filter)
    }
}

impl TryFrom<ReportFilterForm> for MovementFilter {
    type Error = CoreError;

    fn try_from(form: ReportFilterForm) -> Result<Self, Self::Error> {
        form.into_filter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use estoque_core::{MovementType, ValidationError};

    fn product_form() -> ProductForm {
        ProductForm {
            name: " Gloves ".into(),
            category: "EPI".into(),
            contract: Some("  ".into()),
            unit: "pair".into(),
            quantity: "10".into(),
            unit_value: "12,90".into(),
            min_stock: "5".into(),
        }
    }

    #[test]
    fn test_product_form() {
        let product = product_form().into_new_product().unwrap();

        assert_eq!(product.name, "Gloves");
        assert_eq!(product.contract, None);
        assert_eq!(product.quantity, 10);
        assert_eq!(product.unit_value.cents(), 1290);
        assert_eq!(product.min_stock, 5);
    }

    #[test]
    fn test_product_form_blanks_and_errors() {
        let form = ProductForm {
            quantity: String::new(),
            unit_value: String::new(),
            min_stock: String::new(),
            ..product_form()
        };
        let product = form.into_new_product().unwrap();
        assert_eq!(product.quantity, 0);
        assert!(product.unit_value.is_zero());

        let form = ProductForm {
            quantity: "ten".into(),
            ..product_form()
        };
        assert!(matches!(form.into_new_product(), Err(CoreError::Validation(_))));

        let form = ProductForm {
            unit_value: "1.234,56".into(),
            ..product_form()
        };
        assert!(matches!(
            form.into_new_product(),
            Err(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));

        let form = ProductForm {
            name: "   ".into(),
            ..product_form()
        };
        assert!(form.into_new_product().is_err());
    }

    #[test]
    fn test_product_update_ignores_quantity() {
        let form = ProductForm {
            quantity: "not even a number".into(),
            contract: Some("CT-2024/01".into()),
            ..product_form()
        };
        let update = form.into_update().unwrap();

        assert_eq!(update.contract.as_deref(), Some("CT-2024/01"));
        assert_eq!(update.unit_value.cents(), 1290);
    }

    #[test]
    fn test_movement_form() {
        let form = MovementForm {
            product_id: "3".into(),
            kind: "Saída".into(),
            quantity: " 6 ".into(),
            responsible: "Ana".into(),
            note: Some(String::new()),
        };
        let movement = form.into_new_movement().unwrap();

        assert_eq!(movement.product_id, 3);
        assert_eq!(movement.kind, MovementType::Outbound);
        assert_eq!(movement.quantity, 6);
        assert_eq!(movement.note, None);
    }

    #[test]
    fn test_movement_form_rejects_bad_quantity() {
        for raw in ["0", "-2", "1.5", "abc", ""] {
            let form = MovementForm {
                product_id: "1".into(),
                kind: "Entrada".into(),
                quantity: raw.into(),
                responsible: "Ana".into(),
                note: None,
            };
            assert!(
                matches!(form.into_new_movement(), Err(CoreError::InvalidQuantity { .. })),
                "{raw:?} should be an invalid quantity"
            );
        }
    }

    #[test]
    fn test_movement_form_rejects_unknown_type() {
        let form = MovementForm {
            product_id: "1".into(),
            kind: "Transfer".into(),
            quantity: "1".into(),
            responsible: "Ana".into(),
            note: None,
        };
        assert!(matches!(
            form.into_new_movement(),
            Err(CoreError::Validation(ValidationError::NotAllowed { .. }))
        ));
    }

    #[test]
    fn test_filter_forms() {
        let filter = ProductFilter::from(ProductFilterForm {
            name: Some(" lov ".into()),
            category: Some(String::new()),
            contract: None,
        });
        assert_eq!(filter.name_contains.as_deref(), Some("lov"));
        assert!(filter.category_contains.is_none());

        let filter = ReportFilterForm {
            product_id: Some(String::new()),
            kind: Some("entrada".into()),
            date_from: Some("2024-01-10".into()),
            date_to: Some("2024-01-10".into()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.product_id, None);
        assert_eq!(filter.kind, Some(MovementType::Inbound));
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2024, 1, 10));

        let inverted = ReportFilterForm {
            date_from: Some("2024-02-01".into()),
            date_to: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert!(MovementFilter::try_from(inverted).is_err());

        let bad_date = ReportFilterForm {
            date_from: Some("10/01/2024".into()),
            ..Default::default()
        };
        assert!(bad_date.into_filter().is_err());
    }
}
