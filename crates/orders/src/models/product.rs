//! Product model.

use orderly_kernel::{AppResult, Resource};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Linked, missing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: u64,
    pub name: String,
}

/// Payload for creating or replacing a product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductData {
    pub name: Option<String>,
}

impl ProductData {
    pub fn into_name(self) -> AppResult<String> {
        self.name.ok_or_else(|| missing("product", "name"))
    }
}

impl Resource for Linked<Product> {
    fn url(&self) -> String {
        self.links().product(self.record.id)
    }

    fn export_data(&self) -> Value {
        json!({
            "self_url": self.url(),
            "name": self.record.name,
        })
    }
}
