//! Configuration for the generator and the transform job
//!
//! Both configs deserialize from YAML with every field defaulted, so a file
//! only needs the keys it wants to set. Command-line flags are applied on top
//! of the loaded values by the CLI runner.

use crate::error::{Error, Result, ResultExt};
use crate::sink::RetryPolicy;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default catalog database
pub const DEFAULT_DATABASE: &str = "agentic_oms_db";

// ============================================================================
// Retry Config
// ============================================================================

/// Retry settings for sink writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Backoff strategy
    #[serde(default)]
    pub backoff_type: BackoffType,
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    5000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_type: BackoffType::default(),
        }
    }
}

impl RetryConfig {
    /// Build the runtime retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_backoff(
                self.backoff_type,
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            )
    }
}

// ============================================================================
// Generator Config
// ============================================================================

/// Settings for the synthetic order generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Cloud region for all three sinks
    #[serde(default = "default_region")]
    pub region: String,

    /// Bucket receiving archived events (required)
    #[serde(default)]
    pub bucket: String,

    /// Order table name
    #[serde(default = "default_table")]
    pub table: String,

    /// Event stream name
    #[serde(default = "default_stream")]
    pub stream: String,

    /// Number of orders to generate
    #[serde(default = "default_count")]
    pub count: u64,

    /// Delay between orders, in seconds
    #[serde(default = "default_sleep", rename = "sleep")]
    pub sleep_secs: f64,

    /// Seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,

    /// Write to in-process sinks instead of the cloud
    #[serde(default)]
    pub dry_run: bool,

    /// Sink retry settings
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_table() -> String {
    "Orders".to_string()
}

fn default_stream() -> String {
    "oms-events-stream".to_string()
}

fn default_count() -> u64 {
    200
}

fn default_sleep() -> f64 {
    0.01
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            bucket: String::new(),
            table: default_table(),
            stream: default_stream(),
            count: default_count(),
            sleep_secs: default_sleep(),
            seed: None,
            dry_run: false,
            retry: RetryConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Check the settings before any sink is touched
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(Error::missing_field("bucket"));
        }
        if self.region.trim().is_empty() {
            return Err(Error::missing_field("region"));
        }
        if self.table.trim().is_empty() {
            return Err(Error::missing_field("table"));
        }
        if self.stream.trim().is_empty() {
            return Err(Error::missing_field("stream"));
        }
        if !self.sleep_secs.is_finite() || self.sleep_secs < 0.0 {
            return Err(Error::invalid_value(
                "sleep",
                format!("must be a non-negative number of seconds, got {}", self.sleep_secs),
            ));
        }
        Ok(())
    }

    /// Delay between orders
    pub fn sleep_duration(&self) -> Duration {
        Duration::from_secs_f64(self.sleep_secs.max(0.0))
    }
}

// ============================================================================
// Transform Config
// ============================================================================

/// Settings for the batch transform job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Job name, used in logs
    #[serde(default = "default_job_name")]
    pub job_name: String,

    /// Location of the raw JSON events
    #[serde(default)]
    pub source_path: String,

    /// Location receiving the partitioned Parquet output
    #[serde(default)]
    pub target_path: String,

    /// Catalog database
    #[serde(default = "default_database")]
    pub database_name: String,

    /// Catalog table
    #[serde(default)]
    pub table_name: String,

    /// Where table definitions are written (defaults to the target)
    #[serde(default)]
    pub catalog_path: Option<String>,
}

fn default_job_name() -> String {
    "oms-transform".to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            job_name: default_job_name(),
            source_path: String::new(),
            target_path: String::new(),
            database_name: default_database(),
            table_name: String::new(),
            catalog_path: None,
        }
    }
}

impl TransformConfig {
    /// Parse from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Check the settings before any data is read
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("source_path", &self.source_path),
            ("target_path", &self.target_path),
            ("database_name", &self.database_name),
            ("table_name", &self.table_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }

        if paths_overlap(&self.source_path, &self.target_path) {
            return Err(Error::invalid_value(
                "target_path",
                format!(
                    "must not contain or sit inside source_path {}, the overwrite would delete the input",
                    self.source_path
                ),
            ));
        }
        if self.catalog_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(Error::invalid_value("catalog_path", "must not be empty"));
        }
        Ok(())
    }

    /// Catalog location, falling back to the target
    pub fn catalog_location(&self) -> &str {
        self.catalog_path.as_deref().unwrap_or(&self.target_path)
    }
}

/// Path segments with `file://`, `./` and repeated or trailing `/` removed
fn path_segments(path: &str) -> Vec<&str> {
    let path = path.trim();
    let path = path.strip_prefix("file://").unwrap_or(path);
    let root = path.starts_with('/').then_some("/");
    root.into_iter()
        .chain(path.split('/').filter(|s| !s.is_empty() && *s != "."))
        .collect()
}

/// Whether one path equals the other or lies beneath it
fn paths_overlap(a: &str, b: &str) -> bool {
    let (a, b) = (path_segments(a), path_segments(b));
    a.starts_with(&b) || b.starts_with(&a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use test_case::test_case;

    #[test]
    fn test_generator_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.table, "Orders");
        assert_eq!(config.stream, "oms-events-stream");
        assert_eq!(config.count, 200);
        assert_eq!(config.sleep_duration(), Duration::from_millis(10));
        assert_eq!(config.retry.max_retries, 2);
    }

    #[test]
    fn test_generator_yaml_partial() {
        let yaml = r"
bucket: oms-data
count: 25
sleep: 0
seed: 7
retry:
  max_retries: 5
  backoff_type: constant
";
        let config = GeneratorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.bucket, "oms-data");
        assert_eq!(config.count, 25);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.table, "Orders");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_backoff_ms, 100);
        assert_eq!(config.retry.policy().backoff_type, BackoffType::Constant);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generator_validate() {
        let config = GeneratorConfig::default();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { ref field }) if field == "bucket"
        ));

        let config = GeneratorConfig {
            bucket: "b".to_string(),
            sleep_secs: -1.0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfigValue { .. })
        ));

        let config = GeneratorConfig {
            bucket: "b".to_string(),
            sleep_secs: f64::NAN,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transform_validate() {
        let config = TransformConfig {
            source_path: "s3://bucket/raw/events/".to_string(),
            target_path: "s3://bucket/processed/orders/".to_string(),
            table_name: "orders_processed".to_string(),
            ..TransformConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.database_name, DEFAULT_DATABASE);
        assert_eq!(config.catalog_location(), "s3://bucket/processed/orders/");

        let same = TransformConfig {
            target_path: "s3://bucket/raw/events".to_string(),
            ..config.clone()
        };
        assert!(same.validate().is_err());

        let missing = TransformConfig {
            table_name: String::new(),
            ..config
        };
        assert!(matches!(
            missing.validate(),
            Err(Error::MissingConfigField { ref field }) if field == "table_name"
        ));
    }

    #[test_case("data/raw", "data" ; "source inside target")]
    #[test_case("data", "data/raw" ; "target inside source")]
    #[test_case("/data/raw/", "file:///data" ; "file scheme and trailing slash")]
    #[test_case("./data/raw", "data//" ; "dot prefix and repeated slash")]
    #[test_case("s3://bucket/raw/events/", "s3://bucket/raw" ; "object store prefix")]
    fn test_transform_rejects_overlapping_paths(source: &str, target: &str) {
        let config = TransformConfig {
            source_path: source.to_string(),
            target_path: target.to_string(),
            table_name: "orders_processed".to_string(),
            ..TransformConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfigValue { ref field, .. }) if field == "target_path"
        ));
    }

    #[test_case("data/raw", "data/processed" ; "siblings")]
    #[test_case("data/raw", "data/raw_processed" ; "shared name prefix")]
    #[test_case("s3://bucket/raw", "s3://other/raw" ; "different buckets")]
    fn test_transform_accepts_disjoint_paths(source: &str, target: &str) {
        let config = TransformConfig {
            source_path: source.to_string(),
            target_path: target.to_string(),
            table_name: "orders_processed".to_string(),
            ..TransformConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_transform_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "source_path: /data/raw\ntarget_path: /data/processed\ntable_name: orders\ncatalog_path: /data/catalog"
        )
        .unwrap();

        let config = TransformConfig::from_file(file.path()).unwrap();
        assert_eq!(config.job_name, "oms-transform");
        assert_eq!(config.catalog_location(), "/data/catalog");
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            GeneratorConfig::from_yaml_str("count: [1, 2"),
            Err(Error::YamlParse(_))
        ));
    }
}
