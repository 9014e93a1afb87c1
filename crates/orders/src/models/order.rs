//! Order model.
//!
//! Dates are stored in UTC with second precision and exported as
//! `YYYY-MM-DDTHH:MM:SSZ`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use orderly_kernel::{AppError, AppResult, Resource};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Linked, missing};

const EXPORT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
    pub customer_id: u64,
    pub date: DateTime<Utc>,
}

/// Payload for creating or replacing an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderData {
    pub date: Option<String>,
}

impl OrderData {
    /// The validated order date.
    pub fn into_date(self) -> AppResult<DateTime<Utc>> {
        let raw = self.date.ok_or_else(|| missing("order", "date"))?;
        parse_date(&raw)
    }
}

/// Parse an order date.
///
/// RFC 3339 timestamps are converted to UTC; timestamps without an offset
/// and bare dates are taken as UTC.
pub fn parse_date(raw: &str) -> AppResult<DateTime<Utc>> {
    let raw = raw.trim();

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.and_utc()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc()))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        })
        .map_err(|_| AppError::Validation(format!("Invalid order: invalid date {raw}")))?;

    Ok(parsed.trunc_subsecs(0))
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(EXPORT_FORMAT).to_string()
}

impl Resource for Linked<Order> {
    fn url(&self) -> String {
        self.links().order(self.record.id)
    }

    fn export_data(&self) -> Value {
        json!({
            "self_url": self.url(),
            "customer_url": self.links().customer(self.record.customer_id),
            "date": format_date(&self.record.date),
            "items_url": self.links().order_items(self.record.id),
        })
    }
}
