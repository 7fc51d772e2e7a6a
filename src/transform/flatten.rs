//! Projection and explode of event JSON into flat rows

use crate::types::JsonValue;
use chrono::NaiveDate;

/// Payment sub-record carried through unchanged
#[derive(Debug, Clone, PartialEq)]
pub struct FlatPayment {
    pub attempts: Option<i64>,
    pub status: Option<String>,
}

/// One (order, item) pair
///
/// Every field is nullable: a missing or mistyped source field becomes
/// `None` rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub event_id: Option<String>,
    pub event_time: Option<String>,
    pub event_type: Option<String>,
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub created_at: Option<String>,
    pub total_amount: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub fulfilment_warehouse: Option<String>,
    pub payment: Option<FlatPayment>,
    pub sku: Option<String>,
    pub qty: Option<i64>,
    pub price: Option<f64>,
    /// Partition value derived from `created_at`
    pub created_date: Option<NaiveDate>,
}

fn string_field(value: &JsonValue, key: &str) -> Option<String> {
    value.get(key).and_then(JsonValue::as_str).map(str::to_string)
}

fn float_field(value: &JsonValue, key: &str) -> Option<f64> {
    value.get(key).and_then(JsonValue::as_f64)
}

fn int_field(value: &JsonValue, key: &str) -> Option<i64> {
    value.get(key).and_then(JsonValue::as_i64)
}

fn payment_field(order: &JsonValue) -> Option<FlatPayment> {
    let payment = order.get("payment").filter(|p| p.is_object())?;
    Some(FlatPayment {
        attempts: int_field(payment, "attempts"),
        status: string_field(payment, "status"),
    })
}

/// Calendar date of an ISO-8601 timestamp
///
/// Only the leading `YYYY-MM-DD` is read; the time of day and offset are
/// ignored. Anything else yields `None`.
pub fn derive_created_date(created_at: &str) -> Option<NaiveDate> {
    let trimmed = created_at.trim();
    let date = trimmed
        .split_once(['T', ' '])
        .map_or(trimmed, |(date, _)| date);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Flatten one event into one row per element of `order.items`
///
/// A null, missing, empty or non-array `items` yields no rows. A non-object
/// element still yields a row, with null item fields.
pub fn flatten_event(event: &JsonValue) -> Vec<FlatRow> {
    let order = event.get("order").unwrap_or(&JsonValue::Null);
    let Some(items) = order.get("items").and_then(JsonValue::as_array) else {
        return Vec::new();
    };

    let created_at = string_field(order, "createdAt");
    let created_date = created_at.as_deref().and_then(derive_created_date);

    let base = FlatRow {
        event_id: string_field(event, "eventId"),
        event_time: string_field(event, "eventTime"),
        event_type: string_field(event, "eventType"),
        order_id: string_field(order, "orderId"),
        customer_id: string_field(order, "customerId"),
        created_at,
        total_amount: float_field(order, "totalAmount"),
        currency: string_field(order, "currency"),
        status: string_field(order, "status"),
        fulfilment_warehouse: string_field(order, "fulfilmentWarehouse"),
        payment: payment_field(order),
        sku: None,
        qty: None,
        price: None,
        created_date,
    };

    items
        .iter()
        .map(|item| FlatRow {
            sku: string_field(item, "sku"),
            qty: int_field(item, "qty"),
            price: float_field(item, "price"),
            ..base.clone()
        })
        .collect()
}
