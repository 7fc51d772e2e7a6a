//! Generator sinks
//!
//! The three destinations every generated order is written to, in order:
//!
//! - `OrderTable` - key-value table keyed by order id (DynamoDB)
//! - `EventStream` - append-only stream partitioned by order id (Kinesis)
//! - `EventArchive` - blob store holding one envelope per order
//!
//! The order id is the natural idempotency key in all three, so a retried
//! write overwrites rather than duplicates (the stream may still carry a
//! duplicate record, keyed identically).

mod archive;
mod dynamo;
mod item;
mod kinesis;
mod memory;
mod retry;

pub use archive::ObjectStoreArchive;
pub use dynamo::{attribute_value, DynamoOrderTable};
pub use item::{to_item, Item, ItemValue, ORDER_KEY};
pub use kinesis::KinesisEventStream;
pub use memory::{MemoryEventStream, MemoryOrderTable, StreamRecord};
pub use retry::RetryPolicy;

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Where a stream record landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReceipt {
    pub shard_id: String,
    pub sequence_number: String,
}

/// Key-value order table
#[async_trait]
pub trait OrderTable: Send + Sync {
    /// Table name
    fn name(&self) -> &str;

    /// Store an item, replacing any item with the same order id
    async fn put_item(&self, order_id: &str, item: Item) -> Result<()>;
}

/// Ordered append-only event stream
#[async_trait]
pub trait EventStream: Send + Sync {
    /// Stream name
    fn name(&self) -> &str;

    /// Append a record under a partition key
    async fn put_record(&self, partition_key: &str, payload: Bytes) -> Result<StreamReceipt>;
}

/// Path-addressed event archive
#[async_trait]
pub trait EventArchive: Send + Sync {
    /// Write an object, returning its full path
    async fn put_object(&self, key: &str, payload: Bytes) -> Result<String>;
}

#[cfg(test)]
mod tests;
