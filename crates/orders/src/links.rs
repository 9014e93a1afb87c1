//! Absolute resource URLs.
//!
//! Every entity is referenced by an absolute URL rooted at the public base
//! URL; item payloads refer to products the same way, so the parser has to
//! turn those URLs back into ids.

use orderly_kernel::PublicUrl;

/// Prefix of the versioned API.
pub const API_PREFIX: &str = "/api/v1";

/// Builds and parses resource URLs.
#[derive(Debug, Clone)]
pub struct Links {
    base: PublicUrl,
}

impl Links {
    pub fn new(base: PublicUrl) -> Self {
        Self { base }
    }

    fn api(&self, path: &str) -> String {
        self.base.join(&format!("{API_PREFIX}{path}"))
    }

    pub fn customer(&self, id: u64) -> String {
        self.api(&format!("/customers/{id}"))
    }

    pub fn customer_orders(&self, id: u64) -> String {
        self.api(&format!("/customers/{id}/orders/"))
    }

    pub fn product(&self, id: u64) -> String {
        self.api(&format!("/products/{id}"))
    }

    pub fn order(&self, id: u64) -> String {
        self.api(&format!("/orders/{id}"))
    }

    pub fn order_items(&self, id: u64) -> String {
        self.api(&format!("/orders/{id}/items/"))
    }

    pub fn item(&self, id: u64) -> String {
        self.api(&format!("/items/{id}"))
    }

    /// Id of the product an absolute product URL points at.
    ///
    /// Only the path is significant, as long as it names a single product.
    pub fn parse_product(&self, url: &str) -> Option<u64> {
        let parsed = url::Url::parse(url).ok()?;
        parsed
            .path()
            .strip_prefix(API_PREFIX)?
            .strip_prefix("/products/")?
            .parse()
            .ok()
    }
}
