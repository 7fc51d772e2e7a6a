//! Order, line item and event envelope types

use crate::error::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency code stamped on every generated order
pub const CURRENCY: &str = "AUD";

/// Blob store prefix for archived events
pub const ARCHIVE_PREFIX: &str = "raw/events";

// ============================================================================
// Timestamps
// ============================================================================

/// ISO-8601 timestamps with microsecond precision and an explicit offset
///
/// Format: `2025-03-01T09:15:42.123456+00:00`
pub mod iso_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Format a timestamp
    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    PaymentPending,
    PaymentFailed,
    Allocated,
}

impl OrderStatus {
    /// Every status the generator draws from
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Placed,
        OrderStatus::PaymentPending,
        OrderStatus::PaymentFailed,
        OrderStatus::Allocated,
    ];

    /// Payment status implied by the order status
    pub fn payment_status(self) -> PaymentStatus {
        match self {
            OrderStatus::PaymentFailed => PaymentStatus::Declined,
            _ => PaymentStatus::Authorized,
        }
    }

    /// Wire name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::PaymentPending => "PAYMENT_PENDING",
            OrderStatus::PaymentFailed => "PAYMENT_FAILED",
            OrderStatus::Allocated => "ALLOCATED",
        }
    }
}

/// Payment authorization outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Authorized,
    Declined,
}

/// Fulfilment location tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Warehouse {
    #[serde(rename = "WH-1")]
    Wh1,
    #[serde(rename = "WH-2")]
    Wh2,
    #[serde(rename = "WH-3")]
    Wh3,
}

impl Warehouse {
    pub const ALL: [Warehouse; 3] = [Warehouse::Wh1, Warehouse::Wh2, Warehouse::Wh3];
}

/// Event type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventType {
    #[default]
    #[serde(rename = "ORDER_CREATED")]
    OrderCreated,
}

// ============================================================================
// Order
// ============================================================================

/// A single order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub sku: String,
    pub qty: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl LineItem {
    /// qty × price
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.qty) * self.price
    }
}

/// Nested payment sub-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub status: PaymentStatus,
    pub attempts: u32,
}

/// Synthetic customer purchase
///
/// `total_amount` is fixed at construction to the exact sum of the item
/// line totals. Nothing in this crate mutates an order after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    #[serde(with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
    pub customer_id: String,
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub fulfilment_warehouse: Warehouse,
    pub payment: Payment,
    #[serde(with = "iso_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl Order {
    /// Build an order, deriving the total and payment sub-record
    pub fn new(
        order_id: impl Into<String>,
        created_at: DateTime<Utc>,
        customer_id: impl Into<String>,
        items: Vec<LineItem>,
        status: OrderStatus,
        fulfilment_warehouse: Warehouse,
    ) -> Self {
        let total_amount = Self::computed_total(&items);
        Self {
            order_id: order_id.into(),
            created_at,
            customer_id: customer_id.into(),
            items,
            total_amount,
            currency: CURRENCY.to_string(),
            status,
            fulfilment_warehouse,
            payment: Payment {
                status: status.payment_status(),
                attempts: 1,
            },
            last_updated: created_at,
        }
    }

    /// Exact sum of qty × price over the items
    pub fn computed_total(items: &[LineItem]) -> Decimal {
        items.iter().map(LineItem::line_total).sum()
    }

    /// Whether the stored total still matches the items
    pub fn is_consistent(&self) -> bool {
        self.total_amount == Self::computed_total(&self.items)
    }
}

// ============================================================================
// Event Envelope
// ============================================================================

/// Delivery wrapper around an order for the stream and blob sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event_id: String,
    #[serde(with = "iso_timestamp")]
    pub event_time: DateTime<Utc>,
    pub event_type: EventType,
    pub order: Order,
}

impl EventEnvelope {
    /// Wrap a freshly created order; the event shares the order's creation moment
    pub fn created(order: Order, event_id: Uuid) -> Self {
        Self {
            event_id: event_id.to_string(),
            event_time: order.created_at,
            event_type: EventType::OrderCreated,
            order,
        }
    }

    /// Order identifier, used as stream partition key and blob name
    pub fn order_id(&self) -> &str {
        &self.order.order_id
    }

    /// Blob store key: `raw/events/{orderId}.json`
    pub fn archive_key(&self) -> String {
        format!("{ARCHIVE_PREFIX}/{}.json", self.order.order_id)
    }

    /// Serialized payload shared by the stream and blob sinks
    pub fn to_json_bytes(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}
