//! Tests for generator sinks

use super::*;
use crate::error::{Error, SinkKind};
use crate::model::{LineItem, Order, OrderStatus, Warehouse};
use crate::storage::StorageLocation;
use crate::types::BackoffType;
use aws_sdk_dynamodb::types::AttributeValue;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn sample_order() -> Order {
    Order::new(
        "ORD-00C0FFEE",
        Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap(),
        "CUST-1000",
        vec![
            LineItem {
                sku: "SKU-100".to_string(),
                qty: 2,
                price: Decimal::from_str("9.99").unwrap(),
            },
            LineItem {
                sku: "SKU-999".to_string(),
                qty: 1,
                price: Decimal::from_str("5.00").unwrap(),
            },
        ],
        OrderStatus::PaymentPending,
        Warehouse::Wh3,
    )
}

fn fast_policy(retries: u32) -> RetryPolicy {
    RetryPolicy::default().with_max_retries(retries).with_backoff(
        BackoffType::Constant,
        Duration::from_millis(1),
        Duration::from_millis(1),
    )
}

// ============================================================================
// Item Conversion Tests
// ============================================================================

#[test]
fn test_item_keeps_exact_total() {
    let item = to_item(&sample_order()).unwrap();

    assert_eq!(item[ORDER_KEY].as_str(), Some("ORD-00C0FFEE"));
    assert_eq!(
        item["totalAmount"].as_decimal().unwrap().to_string(),
        "24.98"
    );
}

#[test]
fn test_item_preserves_nesting() {
    let item = to_item(&sample_order()).unwrap();

    let ItemValue::L(items) = &item["items"] else {
        panic!("Expected list of items");
    };
    assert_eq!(items.len(), 2);

    let ItemValue::M(first) = &items[0] else {
        panic!("Expected item map");
    };
    assert_eq!(first["qty"], ItemValue::N(Decimal::from(2)));
    assert_eq!(first["price"].as_decimal(), Decimal::from_str("9.99").ok());

    let ItemValue::M(payment) = &item["payment"] else {
        panic!("Expected payment map");
    };
    assert_eq!(payment["status"].as_str(), Some("AUTHORIZED"));
}

#[test]
fn test_item_value_from_json_scalars() {
    let value = json!({"a": null, "b": true, "c": 0.1, "d": -3});
    let ItemValue::M(map) = ItemValue::from_json(&value).unwrap() else {
        panic!("Expected map");
    };

    assert_eq!(map["a"], ItemValue::Null);
    assert_eq!(map["b"], ItemValue::Bool(true));
    assert_eq!(map["c"].as_decimal().unwrap().to_string(), "0.1");
    assert_eq!(map["d"], ItemValue::N(Decimal::from(-3)));
}

#[test]
fn test_attribute_value_mapping() {
    let item = to_item(&sample_order()).unwrap();

    assert_eq!(
        attribute_value(&item["totalAmount"]),
        AttributeValue::N("24.98".to_string())
    );
    assert_eq!(
        attribute_value(&ItemValue::Null),
        AttributeValue::Null(true)
    );

    let AttributeValue::L(items) = attribute_value(&item["items"]) else {
        panic!("Expected list attribute");
    };
    assert_eq!(items.len(), 2);
}

// ============================================================================
// In-Memory Sink Tests
// ============================================================================

#[tokio::test]
async fn test_memory_table_is_keyed_by_order_id() {
    let table = MemoryOrderTable::new("Orders");
    let item = to_item(&sample_order()).unwrap();

    table.put_item("ORD-00C0FFEE", item.clone()).await.unwrap();
    table.put_item("ORD-00C0FFEE", item.clone()).await.unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.get("ORD-00C0FFEE"), Some(item));
    assert_eq!(table.name(), "Orders");
}

#[tokio::test]
async fn test_memory_stream_sequence_numbers_increase() {
    let stream = MemoryEventStream::new("oms-events-stream");

    let first = stream
        .put_record("ORD-1", Bytes::from_static(b"{}"))
        .await
        .unwrap();
    let second = stream
        .put_record("ORD-2", Bytes::from_static(b"{}"))
        .await
        .unwrap();

    assert_eq!(first.shard_id, MemoryEventStream::SHARD_ID);
    assert!(second.sequence_number > first.sequence_number);
    assert_eq!(stream.records().len(), 2);
    assert_eq!(stream.records()[1].partition_key, "ORD-2");
}

#[tokio::test]
async fn test_object_store_archive_writes_key() {
    let archive = ObjectStoreArchive::new(StorageLocation::in_memory(""));
    let path = archive
        .put_object("raw/events/ORD-1.json", Bytes::from_static(b"{}"))
        .await
        .unwrap();

    assert_eq!(path, "memory://raw/events/ORD-1.json");
    assert_eq!(
        archive.location().list().await.unwrap(),
        vec!["raw/events/ORD-1.json"]
    );
}

// ============================================================================
// Retry Tests
// ============================================================================

#[test]
fn test_backoff_is_capped() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(policy.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(policy.calculate_backoff(20), Duration::from_secs(5));
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failure() {
    let calls = AtomicU32::new(0);

    let result = fast_policy(2)
        .run(SinkKind::Stream, "ORD-1", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(Error::sink(SinkKind::Stream, "ORD-1", "throttled", true))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retry_gives_up_after_max_retries() {
    let calls = AtomicU32::new(0);

    let result: crate::Result<()> = fast_policy(2)
        .run(SinkKind::Table, "ORD-1", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::sink(SinkKind::Table, "ORD-1", "throttled", true)) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_non_retryable_error_fails_fast_and_names_sink() {
    let calls = AtomicU32::new(0);

    let result: crate::Result<()> = fast_policy(5)
        .run(SinkKind::Archive, "ORD-9", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::config("bad bucket")) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    match result.unwrap_err() {
        Error::Sink { sink, order_id, .. } => {
            assert_eq!(sink, SinkKind::Archive);
            assert_eq!(order_id, "ORD-9");
        }
        other => panic!("Expected sink error, got {other}"),
    }
}
