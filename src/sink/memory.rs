//! In-process table and stream, used for dry runs and tests

use super::{EventStream, Item, OrderTable, StreamReceipt};
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Table held in a map keyed by order id
#[derive(Debug, Default)]
pub struct MemoryOrderTable {
    name: String,
    items: Mutex<BTreeMap<String, Item>>,
}

impl MemoryOrderTable {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Mutex::new(BTreeMap::new()),
        }
    }

    /// Look up an item by order id
    pub fn get(&self, order_id: &str) -> Option<Item> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(order_id)
            .cloned()
    }

    /// Stored order ids, sorted
    pub fn keys(&self) -> Vec<String> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderTable for MemoryOrderTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_item(&self, order_id: &str, item: Item) -> Result<()> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(order_id.to_string(), item);
        Ok(())
    }
}

/// A record appended to a `MemoryEventStream`
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    pub partition_key: String,
    pub sequence_number: String,
    pub data: Bytes,
}

/// Single-shard stream held in a vector
#[derive(Debug, Default)]
pub struct MemoryEventStream {
    name: String,
    records: Mutex<Vec<StreamRecord>>,
}

impl MemoryEventStream {
    pub const SHARD_ID: &'static str = "shardId-000000000000";

    /// Create an empty stream
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all records in append order
    pub fn records(&self) -> Vec<StreamRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EventStream for MemoryEventStream {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_record(&self, partition_key: &str, payload: Bytes) -> Result<StreamReceipt> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let sequence_number = format!("{:056}", records.len() + 1);
        records.push(StreamRecord {
            partition_key: partition_key.to_string(),
            sequence_number: sequence_number.clone(),
            data: payload,
        });

        Ok(StreamReceipt {
            shard_id: Self::SHARD_ID.to_string(),
            sequence_number,
        })
    }
}
