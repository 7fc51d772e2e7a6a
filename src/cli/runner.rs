//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, GenerateArgs, OutputFormat, TransformArgs};
use crate::config::{GeneratorConfig, TransformConfig};
use crate::error::Result;
use crate::generator::Generator;
use crate::sink::{
    DynamoOrderTable, EventArchive, EventStream, KinesisEventStream, MemoryEventStream,
    MemoryOrderTable, ObjectStoreArchive, OrderTable,
};
use crate::storage::StorageLocation;
use crate::transform::TransformJob;
use aws_config::{BehaviorVersion, Region};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// The three generator sinks
struct Sinks {
    table: Arc<dyn OrderTable>,
    stream: Arc<dyn EventStream>,
    archive: Arc<dyn EventArchive>,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Generate(args) => self.generate(args).await,
            Commands::Transform(args) => self.transform(args).await,
        }
    }

    /// Resolve the generator config: file, then flags, then validation
    pub fn generator_config(&self, args: &GenerateArgs) -> Result<GeneratorConfig> {
        let mut config = match &self.cli.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        args.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Resolve the transform config: file, then flags, then validation
    pub fn transform_config(&self, args: &TransformArgs) -> Result<TransformConfig> {
        let mut config = match &self.cli.config {
            Some(path) => TransformConfig::from_file(path)?,
            None => TransformConfig::default(),
        };
        args.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    async fn generate(&self, args: &GenerateArgs) -> Result<()> {
        let config = self.generator_config(args)?;
        let sinks = Self::build_sinks(&config).await?;

        let mut generator =
            Generator::from_config(&config, sinks.table, sinks.stream, sinks.archive);
        let report = generator.run().await?;
        self.emit(&report)
    }

    async fn transform(&self, args: &TransformArgs) -> Result<()> {
        let config = self.transform_config(args)?;
        let report = TransformJob::from_config(&config)?.run().await?;
        self.emit(&report)
    }

    /// Cloud sinks, or in-process ones for a dry run
    async fn build_sinks(config: &GeneratorConfig) -> Result<Sinks> {
        if config.dry_run {
            info!("Dry run: writing to in-process sinks");
            return Ok(Sinks {
                table: Arc::new(MemoryOrderTable::new(&config.table)),
                stream: Arc::new(MemoryEventStream::new(&config.stream)),
                archive: Arc::new(ObjectStoreArchive::new(StorageLocation::in_memory(""))),
            });
        }

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        Ok(Sinks {
            table: Arc::new(DynamoOrderTable::new(&sdk_config, &config.table)),
            stream: Arc::new(KinesisEventStream::new(&sdk_config, &config.stream)),
            archive: Arc::new(ObjectStoreArchive::s3(&config.bucket, &config.region)?),
        })
    }

    /// Print a report on stdout
    fn emit<T: Serialize>(&self, report: &T) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(report)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(report)?,
        };
        println!("{line}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bucket: from-file\ncount: 50\ntable: FileOrders").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["oms-pipeline", "-C", &path, "generate", "--count", "5"])
            .unwrap();
        let runner = Runner::new(cli);
        let Commands::Generate(args) = &runner.cli.command else {
            panic!("Expected generate command");
        };
        let config = runner.generator_config(args).unwrap();

        assert_eq!(config.bucket, "from-file");
        assert_eq!(config.table, "FileOrders");
        assert_eq!(config.count, 5);
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        let cli = Cli::try_parse_from(["oms-pipeline", "generate"]).unwrap();
        let runner = Runner::new(cli);
        let Commands::Generate(args) = &runner.cli.command else {
            panic!("Expected generate command");
        };

        assert!(runner.generator_config(args).is_err());
    }

    #[tokio::test]
    async fn test_dry_run_generate() {
        let cli = Cli::try_parse_from([
            "oms-pipeline",
            "generate",
            "--bucket",
            "oms-data",
            "--count",
            "3",
            "--sleep",
            "0",
            "--dry-run",
        ])
        .unwrap();

        Runner::new(cli).run().await.unwrap();
    }

    #[tokio::test]
    async fn test_transform_on_local_paths() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("raw");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(
            source.join("ORD-1.json"),
            br#"{"eventId":"e","order":{"orderId":"ORD-1","createdAt":"2025-03-01T00:00:00+00:00","items":[{"sku":"SKU-1","qty":1,"price":5.0}]}}"#,
        )
        .unwrap();
        let target = dir.path().join("processed");

        let cli = Cli::try_parse_from([
            "oms-pipeline",
            "transform",
            "--source-path",
            source.to_str().unwrap(),
            "--target-path",
            target.to_str().unwrap(),
            "--table-name",
            "orders_processed",
        ])
        .unwrap();

        Runner::new(cli).run().await.unwrap();

        assert!(target.join("_SUCCESS").exists());
        assert!(target
            .join("_catalog/agentic_oms_db/orders_processed.json")
            .exists());
    }
}
