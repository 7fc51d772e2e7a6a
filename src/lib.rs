// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # OMS Pipeline
//!
//! Two utilities for an order-management data pipeline demo: a synthetic
//! order generator feeding a key-value table, an event stream and a blob
//! store, and a batch job flattening the archived events into
//! date-partitioned Parquet.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use oms_pipeline::generator::Generator;
//! use oms_pipeline::sink::{MemoryEventStream, MemoryOrderTable, ObjectStoreArchive};
//! use oms_pipeline::storage::StorageLocation;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> oms_pipeline::Result<()> {
//!     let mut generator = Generator::new(
//!         Arc::new(MemoryOrderTable::new("Orders")),
//!         Arc::new(MemoryEventStream::new("oms-events-stream")),
//!         Arc::new(ObjectStoreArchive::new(StorageLocation::parse_or_create("./data")?)),
//!     )
//!     .with_count(10);
//!     generator.run().await?;
//!
//!     let job = oms_pipeline::transform::TransformJob::from_config(&oms_pipeline::config::TransformConfig {
//!         source_path: "./data/raw/events".into(),
//!         target_path: "./data/processed/orders".into(),
//!         table_name: "orders_processed".into(),
//!         ..Default::default()
//!     })?;
//!     job.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  item    ┌──────────────┐
//! │              ├─────────►│  OrderTable  │  DynamoDB
//! │  Generator   │  record  ├──────────────┤
//! │ (OrderFactory├─────────►│ EventStream  │  Kinesis
//! │  + retries)  │  object  ├──────────────┤
//! │              ├─────────►│ EventArchive │  S3 raw/events/{orderId}.json
//! └──────────────┘          └──────┬───────┘
//!                                  │
//!                       ┌──────────▼───────────┐
//!                       │     TransformJob     │
//!                       │ read → flatten →     │
//!                       │ write → catalog      │
//!                       └──────────┬───────────┘
//!                                  ▼
//!               createdDate=YYYY-MM-DD/part-00000-{run}.snappy.parquet
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Orders, line items and event envelopes
pub mod model;

/// Object storage locations
pub mod storage;

/// Table, stream and archive sinks
pub mod sink;

/// Synthetic order generator
pub mod generator;

/// Batch transform job
pub mod transform;

/// Generator and transform configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{GeneratorConfig, TransformConfig};
pub use generator::{GenerationReport, Generator};
pub use model::{EventEnvelope, Order};
pub use transform::{JobReport, TransformJob};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
