//! CLI module
//!
//! Command-line interface for the pipeline utilities.
//!
//! # Commands
//!
//! - `generate` - Write synthetic orders to the table, stream and bucket
//! - `transform` - Flatten raw events into partitioned Parquet

mod commands;
mod runner;

pub use commands::{Cli, Commands, GenerateArgs, OutputFormat, TransformArgs};
pub use runner::Runner;
