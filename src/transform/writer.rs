//! Hive-style partitioned Parquet output with overwrite semantics

use super::flatten::FlatRow;
use super::schema::{rows_to_batch, PARTITION_COLUMN};
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

/// Directory value for rows whose partition value is null
pub const DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// Empty marker written once all data files are in place
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// One written partition file
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionFile {
    /// Partition value, `None` for the default partition
    pub value: Option<NaiveDate>,
    /// Key relative to the target
    pub key: String,
    /// Full path for reporting
    pub path: String,
    pub rows: usize,
}

/// Result of one overwrite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteSummary {
    pub files: Vec<PartitionFile>,
    /// Pre-existing keys deleted by the overwrite
    pub removed: Vec<String>,
}

impl WriteSummary {
    /// Total rows written
    pub fn rows(&self) -> usize {
        self.files.iter().map(|f| f.rows).sum()
    }

    /// Partition values present in the output
    pub fn partition_values(&self) -> Vec<Option<NaiveDate>> {
        self.files.iter().map(|f| f.value).collect()
    }
}

/// Serialize a batch into Snappy-compressed Parquet bytes
pub fn batch_to_parquet_bytes(batch: &RecordBatch) -> Result<Bytes> {
    let mut buf = Vec::new();
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(props))
        .map_err(|e| Error::output(format!("Failed to create parquet writer: {e}")))?;

    writer
        .write(batch)
        .map_err(|e| Error::output(format!("Failed to write parquet: {e}")))?;

    writer
        .close()
        .map_err(|e| Error::output(format!("Failed to close parquet writer: {e}")))?;

    Ok(Bytes::from(buf))
}

/// Directory name of a partition, e.g. `createdDate=2025-03-01`
pub fn partition_dir(value: Option<NaiveDate>) -> String {
    match value {
        Some(date) => format!("{PARTITION_COLUMN}={}", date.format("%Y-%m-%d")),
        None => format!("{PARTITION_COLUMN}={DEFAULT_PARTITION}"),
    }
}

/// Writes flat rows partitioned by creation date, replacing the target
///
/// New files carry the run id in their name, so they never collide with the
/// previous output. Stale objects are removed only after every new file and
/// the success marker are written.
#[derive(Debug, Clone)]
pub struct PartitionedWriter {
    target: StorageLocation,
    run_id: String,
}

impl PartitionedWriter {
    /// Writer for a target with a fresh run id
    pub fn new(target: StorageLocation) -> Self {
        Self {
            target,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Use a fixed run id
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn target(&self) -> &StorageLocation {
        &self.target
    }

    fn file_key(&self, value: Option<NaiveDate>) -> String {
        format!(
            "{}/part-00000-{}.snappy.parquet",
            partition_dir(value),
            self.run_id
        )
    }

    /// Overwrite the target with `rows`
    pub async fn write(&self, rows: Vec<FlatRow>) -> Result<WriteSummary> {
        let mut groups: BTreeMap<Option<NaiveDate>, Vec<FlatRow>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.created_date).or_default().push(row);
        }

        let mut summary = WriteSummary::default();
        let mut written: HashSet<String> = HashSet::new();

        for (value, group) in groups {
            let batch = rows_to_batch(&group)?;
            let data = batch_to_parquet_bytes(&batch)?;
            let key = self.file_key(value);
            let path = self.target.put(&key, data).await?;
            debug!("Wrote {} rows to {}", group.len(), path);

            written.insert(key.clone());
            summary.files.push(PartitionFile {
                value,
                key,
                path,
                rows: group.len(),
            });
        }

        self.target.put(SUCCESS_MARKER, Bytes::new()).await?;
        written.insert(SUCCESS_MARKER.to_string());

        for key in self.target.list().await? {
            if !written.contains(&key) {
                self.target.delete(&key).await?;
                summary.removed.push(key);
            }
        }

        info!(
            "Wrote {} rows in {} partitions to {}, removed {} stale objects",
            summary.rows(),
            summary.files.len(),
            self.target.display_path(""),
            summary.removed.len()
        );
        Ok(summary)
    }
}
