//! Key-value table items
//!
//! An order is stored as a tree of typed attribute values. Every JSON
//! float is converted to an exact decimal on the way in, so stored totals
//! carry no binary rounding artifacts.

use crate::error::{Error, Result};
use crate::model::{float_to_decimal, Order};
use crate::types::JsonValue;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Primary key attribute of the order table
pub const ORDER_KEY: &str = "orderId";

/// A table item: attribute name to value
pub type Item = BTreeMap<String, ItemValue>;

/// A typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue {
    /// String
    S(String),
    /// Exact number
    N(Decimal),
    /// Boolean
    Bool(bool),
    /// Null
    Null,
    /// Ordered list
    L(Vec<ItemValue>),
    /// Nested map
    M(Item),
}

impl ItemValue {
    /// Convert a JSON value, turning floats into exact decimals
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        Ok(match value {
            JsonValue::Null => ItemValue::Null,
            JsonValue::Bool(b) => ItemValue::Bool(*b),
            JsonValue::String(s) => ItemValue::S(s.clone()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ItemValue::N(Decimal::from(i))
                } else if let Some(u) = n.as_u64() {
                    ItemValue::N(Decimal::from(u))
                } else {
                    let f = n
                        .as_f64()
                        .ok_or_else(|| Error::decimal(n, "unrepresentable number"))?;
                    ItemValue::N(float_to_decimal(f)?)
                }
            }
            JsonValue::Array(arr) => {
                ItemValue::L(arr.iter().map(Self::from_json).collect::<Result<_>>()?)
            }
            JsonValue::Object(obj) => ItemValue::M(
                obj.iter()
                    .map(|(k, v)| Self::from_json(v).map(|v| (k.clone(), v)))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// String content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ItemValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// Decimal content, if this is a number
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ItemValue::N(n) => Some(*n),
            _ => None,
        }
    }
}

/// Build the table item for an order
pub fn to_item(order: &Order) -> Result<Item> {
    let json = serde_json::to_value(order)?;
    match ItemValue::from_json(&json)? {
        ItemValue::M(item) => Ok(item),
        _ => Err(Error::Other(format!(
            "order {} did not serialize to an object",
            order.order_id
        ))),
    }
}
