//! Order data model
//!
//! Business objects produced by the generator and consumed by the
//! transform job.
//!
//! # Overview
//!
//! - `Order` - Synthetic customer purchase with line items and payment
//! - `EventEnvelope` - Identity/timestamp/type wrapper around an order
//! - `float_to_decimal` - String-mediated float to exact decimal conversion

mod decimal;
mod types;

pub use decimal::float_to_decimal;
pub use types::{
    iso_timestamp, EventEnvelope, EventType, LineItem, Order, OrderStatus, Payment,
    PaymentStatus, Warehouse, ARCHIVE_PREFIX, CURRENCY,
};
