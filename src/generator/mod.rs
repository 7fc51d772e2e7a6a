//! Synthetic order generator
//!
//! # Overview
//!
//! The generator module provides:
//! - `OrderFactory` - Randomized, optionally seeded order construction
//! - `Generator` - The loop writing each order to the table, stream and archive
//! - `GenerationReport` - Counts returned once the loop finishes
//!
//! Each order is written to the three sinks in sequence before the next one
//! is built. The writes are independent steps, each under the retry policy;
//! nothing is rolled back when a later step fails.

mod factory;

pub use factory::OrderFactory;

use crate::config::GeneratorConfig;
use crate::error::{Result, SinkKind};
use crate::model::EventEnvelope;
use crate::sink::{to_item, EventArchive, EventStream, OrderTable, RetryPolicy};
use chrono::Utc;
use rand::rngs::SmallRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Progress is logged every this many orders
const PROGRESS_INTERVAL: u64 = 10;

/// Outcome of a generator run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Orders fully written to all three sinks
    pub orders: u64,
    /// Items put into the table
    pub table_items: u64,
    /// Records appended to the stream
    pub stream_records: u64,
    /// Objects written to the archive
    pub blobs: u64,
    /// Sequence number of the last stream record
    pub last_sequence_number: Option<String>,
    /// Wall-clock duration
    pub duration_ms: u64,
}

/// Writes synthetic orders to a table, a stream and an archive
pub struct Generator {
    table: Arc<dyn OrderTable>,
    stream: Arc<dyn EventStream>,
    archive: Arc<dyn EventArchive>,
    factory: OrderFactory<SmallRng>,
    count: u64,
    sleep: Duration,
    retry: RetryPolicy,
}

impl Generator {
    /// Create a generator with default count, delay and retry policy
    pub fn new(
        table: Arc<dyn OrderTable>,
        stream: Arc<dyn EventStream>,
        archive: Arc<dyn EventArchive>,
    ) -> Self {
        let defaults = GeneratorConfig::default();
        Self {
            table,
            stream,
            archive,
            factory: OrderFactory::seeded(None),
            count: defaults.count,
            sleep: defaults.sleep_duration(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a generator from a validated config
    pub fn from_config(
        config: &GeneratorConfig,
        table: Arc<dyn OrderTable>,
        stream: Arc<dyn EventStream>,
        archive: Arc<dyn EventArchive>,
    ) -> Self {
        Self::new(table, stream, archive)
            .with_count(config.count)
            .with_sleep(config.sleep_duration())
            .with_seed(config.seed)
            .with_retry(config.retry.policy())
    }

    /// Set the number of orders
    #[must_use]
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    /// Set the delay between orders
    #[must_use]
    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    /// Seed the order factory
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.factory = OrderFactory::seeded(seed);
        self
    }

    /// Set the retry policy for sink writes
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generate and write every order
    pub async fn run(&mut self) -> Result<GenerationReport> {
        let start = Instant::now();
        let mut report = GenerationReport::default();

        info!(
            "Generating {} orders into table {} and stream {}",
            self.count,
            self.table.name(),
            self.stream.name()
        );

        for i in 0..self.count {
            let envelope = self.factory.make_event(Utc::now());
            self.emit(&envelope, &mut report).await?;
            report.orders += 1;

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("{}/{} orders generated", i + 1, self.count);
            }

            if !self.sleep.is_zero() {
                tokio::time::sleep(self.sleep).await;
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Generated {} orders in {}ms",
            report.orders, report.duration_ms
        );
        Ok(report)
    }

    /// Write one envelope to the table, then the stream, then the archive
    async fn emit(&self, envelope: &EventEnvelope, report: &mut GenerationReport) -> Result<()> {
        let order_id = envelope.order_id();
        let item = to_item(&envelope.order)?;
        let payload = envelope.to_json_bytes()?;
        let mut written: Vec<SinkKind> = Vec::with_capacity(3);

        let table = self
            .retry
            .run(SinkKind::Table, order_id, || {
                self.table.put_item(order_id, item.clone())
            })
            .await;
        if let Err(e) = table {
            log_partial(order_id, SinkKind::Table, &written);
            return Err(e);
        }
        written.push(SinkKind::Table);
        report.table_items += 1;

        let receipt = match self
            .retry
            .run(SinkKind::Stream, order_id, || {
                self.stream.put_record(order_id, payload.clone())
            })
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                log_partial(order_id, SinkKind::Stream, &written);
                return Err(e);
            }
        };
        debug!(
            "Record put to shard {} at sequence number {}",
            receipt.shard_id, receipt.sequence_number
        );
        written.push(SinkKind::Stream);
        report.stream_records += 1;
        report.last_sequence_number = Some(receipt.sequence_number);

        let key = envelope.archive_key();
        let path = match self
            .retry
            .run(SinkKind::Archive, order_id, || {
                self.archive.put_object(&key, payload.clone())
            })
            .await
        {
            Ok(path) => path,
            Err(e) => {
                log_partial(order_id, SinkKind::Archive, &written);
                return Err(e);
            }
        };
        debug!("Archived event for {} at {}", order_id, path);
        report.blobs += 1;

        Ok(())
    }
}

/// Record which sinks already hold an order whose later write failed
fn log_partial(order_id: &str, failed: SinkKind, written: &[SinkKind]) {
    let done = if written.is_empty() {
        "none".to_string()
    } else {
        written
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    error!(
        "Order {} failed at {}; already written to: {}",
        order_id, failed, done
    );
}
