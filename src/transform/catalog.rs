//! Table registration in a metadata catalog

use super::schema::{flat_schema, hive_type, PARTITION_COLUMN};
use super::writer::DEFAULT_PARTITION;
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Column name and Hive type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ColumnDef {
    fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Definition of a partitioned Parquet table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub database: String,
    pub table: String,
    /// Root location of the data files
    pub location: String,
    pub format: String,
    pub columns: Vec<ColumnDef>,
    pub partition_keys: Vec<ColumnDef>,
    /// Partition directory values present after the last write
    pub partitions: Vec<String>,
}

impl TableDefinition {
    /// Definition of the flattened order table at `location`
    pub fn flat_orders(
        database: &str,
        table: &str,
        location: &str,
        partition_values: &[Option<NaiveDate>],
    ) -> Result<Self> {
        let columns = flat_schema()
            .fields()
            .iter()
            .map(|f| Ok(ColumnDef::new(f.name(), hive_type(f.data_type())?)))
            .collect::<Result<Vec<_>>>()?;

        let partitions = partition_values
            .iter()
            .map(|v| match v {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => DEFAULT_PARTITION.to_string(),
            })
            .collect();

        Ok(Self {
            database: database.to_string(),
            table: table.to_string(),
            location: location.to_string(),
            format: "parquet".to_string(),
            columns,
            partition_keys: vec![ColumnDef::new(PARTITION_COLUMN, "date")],
            partitions,
        })
    }
}

/// A metadata catalog that tables can be registered in
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Register a table, replacing any existing definition of the same name
    ///
    /// Returns where the definition was recorded.
    async fn register_table(&self, definition: &TableDefinition) -> Result<String>;
}

/// Catalog kept as JSON manifests in object storage
///
/// Each table lives at `_catalog/{database}/{table}.json` below the root.
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    root: StorageLocation,
}

impl ManifestCatalog {
    pub const PREFIX: &'static str = "_catalog";

    pub fn new(root: StorageLocation) -> Self {
        Self { root }
    }

    /// Key of a table's manifest relative to the root
    pub fn manifest_key(database: &str, table: &str) -> String {
        format!("{}/{database}/{table}.json", Self::PREFIX)
    }

    /// Read back a registered definition
    pub async fn load(&self, database: &str, table: &str) -> Result<TableDefinition> {
        let data = self.root.get(&Self::manifest_key(database, table)).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[async_trait]
impl Catalog for ManifestCatalog {
    async fn register_table(&self, definition: &TableDefinition) -> Result<String> {
        let key = Self::manifest_key(&definition.database, &definition.table);
        let body = serde_json::to_vec_pretty(definition).map_err(|e| {
            Error::catalog(&definition.database, &definition.table, e.to_string())
        })?;

        let path = self
            .root
            .put(&key, Bytes::from(body))
            .await
            .map_err(|e| Error::catalog(&definition.database, &definition.table, e.to_string()))?;

        info!(
            "Registered table {}.{} at {}",
            definition.database, definition.table, path
        );
        Ok(path)
    }
}
