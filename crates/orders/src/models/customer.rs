//! Customer model.

use orderly_kernel::{AppResult, Resource};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Linked, missing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: u64,
    pub name: String,
}

/// Payload for creating or replacing a customer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerData {
    pub name: Option<String>,
}

impl CustomerData {
    /// The validated customer name.
    pub fn into_name(self) -> AppResult<String> {
        self.name.ok_or_else(|| missing("customer", "name"))
    }
}

impl Resource for Linked<Customer> {
    fn url(&self) -> String {
        self.links().customer(self.record.id)
    }

    fn export_data(&self) -> Value {
        json!({
            "self_url": self.url(),
            "name": self.record.name,
            "orders_url": self.links().customer_orders(self.record.id),
        })
    }
}
