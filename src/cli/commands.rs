//! CLI commands and argument parsing

use crate::config::{GeneratorConfig, TransformConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Order management pipeline utilities
#[derive(Parser, Debug)]
#[command(name = "oms-pipeline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML) for the chosen command; flags override it
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate synthetic orders into DynamoDB, Kinesis and S3
    Generate(GenerateArgs),

    /// Flatten raw order events into date-partitioned Parquet
    Transform(TransformArgs),
}

/// Generator flags
#[derive(Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// AWS region [default: us-east-1]
    #[arg(long)]
    pub region: Option<String>,

    /// S3 bucket receiving raw events (required)
    #[arg(long)]
    pub bucket: Option<String>,

    /// DynamoDB table [default: Orders]
    #[arg(long)]
    pub table: Option<String>,

    /// Kinesis stream [default: oms-events-stream]
    #[arg(long)]
    pub stream: Option<String>,

    /// Number of orders [default: 200]
    #[arg(long)]
    pub count: Option<u64>,

    /// Seconds to wait between orders [default: 0.01]
    #[arg(long)]
    pub sleep: Option<f64>,

    /// Seed for reproducible orders
    #[arg(long)]
    pub seed: Option<u64>,

    /// Retries per sink write [default: 2]
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Write to in-process sinks instead of AWS
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    /// Apply the given flags on top of a config
    pub fn apply(&self, config: &mut GeneratorConfig) {
        if let Some(region) = &self.region {
            config.region.clone_from(region);
        }
        if let Some(bucket) = &self.bucket {
            config.bucket.clone_from(bucket);
        }
        if let Some(table) = &self.table {
            config.table.clone_from(table);
        }
        if let Some(stream) = &self.stream {
            config.stream.clone_from(stream);
        }
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(sleep) = self.sleep {
            config.sleep_secs = sleep;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(retries) = self.max_retries {
            config.retry.max_retries = retries;
        }
        if self.dry_run {
            config.dry_run = true;
        }
    }
}

/// Transform job parameters
///
/// The upper-case spellings used by Glue job arguments are accepted too.
#[derive(Args, Debug, Default, Clone)]
pub struct TransformArgs {
    /// Job name
    #[arg(long, alias = "JOB_NAME")]
    pub job_name: Option<String>,

    /// Location of the raw JSON events
    #[arg(long, alias = "SOURCE_S3_PATH")]
    pub source_path: Option<String>,

    /// Location for the partitioned Parquet output (overwritten)
    #[arg(long, alias = "TARGET_S3_PATH")]
    pub target_path: Option<String>,

    /// Catalog database [default: agentic_oms_db]
    #[arg(long, alias = "DATABASE_NAME")]
    pub database_name: Option<String>,

    /// Catalog table
    #[arg(long, alias = "TABLE_NAME")]
    pub table_name: Option<String>,

    /// Where table definitions are written [default: the target path]
    #[arg(long)]
    pub catalog_path: Option<String>,
}

impl TransformArgs {
    /// Apply the given flags on top of a config
    pub fn apply(&self, config: &mut TransformConfig) {
        if let Some(job_name) = &self.job_name {
            config.job_name.clone_from(job_name);
        }
        if let Some(source) = &self.source_path {
            config.source_path.clone_from(source);
        }
        if let Some(target) = &self.target_path {
            config.target_path.clone_from(target);
        }
        if let Some(database) = &self.database_name {
            config.database_name.clone_from(database);
        }
        if let Some(table) = &self.table_name {
            config.table_name.clone_from(table);
        }
        if self.catalog_path.is_some() {
            config.catalog_path.clone_from(&self.catalog_path);
        }
    }
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single-line JSON
    #[default]
    Json,
    /// Indented JSON
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_flags_override() {
        let cli = Cli::try_parse_from([
            "oms-pipeline",
            "generate",
            "--bucket",
            "oms-data",
            "--count",
            "10",
            "--sleep",
            "0",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Generate(args) = cli.command else {
            panic!("Expected generate command");
        };
        let mut config = GeneratorConfig {
            table: "FromFile".to_string(),
            ..GeneratorConfig::default()
        };
        args.apply(&mut config);

        assert_eq!(config.bucket, "oms-data");
        assert_eq!(config.count, 10);
        assert_eq!(config.sleep_secs, 0.0);
        assert_eq!(config.table, "FromFile");
        assert!(config.dry_run);
    }

    #[test]
    fn test_transform_accepts_glue_argument_names() {
        let cli = Cli::try_parse_from([
            "oms-pipeline",
            "transform",
            "--JOB_NAME",
            "oms-glue-job",
            "--SOURCE_S3_PATH",
            "s3://bucket/raw/events/",
            "--TARGET_S3_PATH",
            "s3://bucket/processed/orders/",
            "--DATABASE_NAME",
            "agentic_oms_db",
            "--TABLE_NAME",
            "orders_processed",
        ])
        .unwrap();

        let Commands::Transform(args) = cli.command else {
            panic!("Expected transform command");
        };
        let mut config = TransformConfig::default();
        args.apply(&mut config);

        assert_eq!(config.job_name, "oms-glue-job");
        assert_eq!(config.source_path, "s3://bucket/raw/events/");
        assert_eq!(config.target_path, "s3://bucket/processed/orders/");
        assert_eq!(config.table_name, "orders_processed");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from([
            "oms-pipeline",
            "transform",
            "--config",
            "job.yaml",
            "--format",
            "pretty",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("job.yaml")));
        assert_eq!(cli.format, OutputFormat::Pretty);
    }
}
