//! Domain records and their JSON projections.

pub mod customer;
pub mod item;
pub mod order;
pub mod product;
pub mod user;

pub use customer::{Customer, CustomerData};
pub use item::{Item, ItemData, ItemFields};
pub use order::{Order, OrderData};
pub use product::{Product, ProductData};
pub use user::User;

use orderly_kernel::AppError;

use crate::links::Links;

/// A stored record paired with the link builder needed to render it.
#[derive(Debug, Clone)]
pub struct Linked<T> {
    pub record: T,
    links: Links,
}

impl<T> Linked<T> {
    pub fn new(record: T, links: &Links) -> Self {
        Self {
            record,
            links: links.clone(),
        }
    }

    /// Wrap a whole collection, keeping its order.
    pub fn all(records: Vec<T>, links: &Links) -> Vec<Self> {
        records.into_iter().map(|r| Self::new(r, links)).collect()
    }

    pub fn links(&self) -> &Links {
        &self.links
    }
}

/// Validation error for a required field absent from a payload.
pub(crate) fn missing(entity: &str, field: &str) -> AppError {
    AppError::Validation(format!("Invalid {entity}: missing {field}"))
}
