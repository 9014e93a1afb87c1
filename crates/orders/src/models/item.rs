//! Order line item model.

use orderly_kernel::{AppError, AppResult, Resource};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Linked, missing};
use crate::links::Links;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub order_id: u64,
    pub product_id: u64,
    pub quantity: i64,
}

/// Payload for creating or replacing an item.
///
/// `quantity` may be sent as a number or a numeric string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemData {
    pub product_url: Option<String>,
    pub quantity: Option<Value>,
}

/// A validated item payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFields {
    pub product_id: u64,
    pub quantity: i64,
}

impl ItemData {
    /// Validate the payload. `product_exists` decides whether a parsed
    /// product id refers to a stored product.
    pub fn validate(
        self,
        links: &Links,
        product_exists: impl FnOnce(u64) -> bool,
    ) -> AppResult<ItemFields> {
        let product_url = self.product_url.ok_or_else(|| missing("order", "product_url"))?;
        let quantity = self.quantity.ok_or_else(|| missing("order", "quantity"))?;
        let quantity = parse_quantity(&quantity)?;

        let invalid_url = || AppError::Validation(format!("Invalid product URL: {product_url}"));
        let product_id = links.parse_product(&product_url).ok_or_else(invalid_url)?;
        if !product_exists(product_id) {
            return Err(invalid_url());
        }

        Ok(ItemFields {
            product_id,
            quantity,
        })
    }
}

fn parse_quantity(value: &Value) -> AppResult<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| AppError::Validation(format!("Invalid order: invalid quantity {value}")))
}

impl Resource for Linked<Item> {
    fn url(&self) -> String {
        self.links().item(self.record.id)
    }

    fn export_data(&self) -> Value {
        json!({
            "self_url": self.url(),
            "order_url": self.links().order(self.record.order_id),
            "product_url": self.links().product(self.record.product_id),
            "quantity": self.record.quantity,
        })
    }
}
