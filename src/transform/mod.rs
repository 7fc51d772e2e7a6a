//! Batch transform job
//!
//! Flattens nested order events into one row per line item and writes them
//! as Parquet partitioned by creation date.
//!
//! # Overview
//!
//! - `read_events` - Lists and parses every visible JSON file under a source
//! - `flatten_event` - Projects the fixed field list and explodes `items`
//! - `rows_to_batch` - Builds an Arrow batch in the fixed `flat_schema()`
//! - `PartitionedWriter` - Overwrites the target with `createdDate=` partitions
//! - `Catalog` - Registers the resulting table definition
//! - `TransformJob` - Runs the steps above in order

mod catalog;
mod flatten;
mod job;
mod schema;
mod source;
mod writer;

pub use catalog::{Catalog, ColumnDef, ManifestCatalog, TableDefinition};
pub use flatten::{derive_created_date, flatten_event, FlatPayment, FlatRow};
pub use job::{JobReport, TransformJob};
pub use schema::{flat_schema, hive_type, rows_to_batch, PARTITION_COLUMN};
pub use source::{is_hidden, parse_events, read_events, SourceEvents};
pub use writer::{
    batch_to_parquet_bytes, partition_dir, PartitionFile, PartitionedWriter, WriteSummary,
    DEFAULT_PARTITION, SUCCESS_MARKER,
};
