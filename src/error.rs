//! Error types for the OMS pipeline
//!
//! This module defines the error hierarchy shared by the generator and the
//! transform job. All public APIs return `Result<T, Error>` where Error is
//! defined here.

use std::fmt;
use thiserror::Error;

/// The sink a generator write was addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Key-value order table
    Table,
    /// Append-only event stream
    Stream,
    /// Blob store event archive
    Archive,
}

impl SinkKind {
    /// Short name used in logs and error messages
    pub fn as_str(self) -> &'static str {
        match self {
            SinkKind::Table => "table",
            SinkKind::Stream => "stream",
            SinkKind::Archive => "archive",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for the OMS pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Generator Errors
    // ============================================================================
    #[error("Failed to write order {order_id} to {sink}: {message}")]
    Sink {
        sink: SinkKind,
        order_id: String,
        message: String,
        retryable: bool,
    },

    #[error("Cannot convert {value} to an exact decimal: {message}")]
    Decimal { value: String, message: String },

    // ============================================================================
    // Transform Errors
    // ============================================================================
    #[error("Malformed source object '{path}': {message}")]
    MalformedSource { path: String, message: String },

    #[error("No input files found at '{path}'")]
    EmptySource { path: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Catalog error for {database}.{table}: {message}")]
    Catalog {
        database: String,
        table: String,
        message: String,
    },

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a sink error
    pub fn sink(
        sink: SinkKind,
        order_id: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self::Sink {
            sink,
            order_id: order_id.into(),
            message: message.into(),
            retryable,
        }
    }

    /// Create a decimal conversion error
    pub fn decimal(value: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::Decimal {
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// Create a malformed source error
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSource {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an empty source error
    pub fn empty_source(path: impl Into<String>) -> Self {
        Self::EmptySource { path: path.into() }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(
        database: impl Into<String>,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Catalog {
            database: database.into(),
            table: table.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Sink { retryable, .. } => *retryable,
            Error::Storage(e) => is_retryable_storage(e),
            _ => false,
        }
    }
}

/// Storage failures that may succeed on a later attempt
fn is_retryable_storage(err: &object_store::Error) -> bool {
    !matches!(
        err,
        object_store::Error::NotFound { .. }
            | object_store::Error::InvalidPath { .. }
            | object_store::Error::NotSupported { .. }
            | object_store::Error::NotImplemented
            | object_store::Error::AlreadyExists { .. }
            | object_store::Error::Precondition { .. }
            | object_store::Error::UnknownConfigurationKey { .. }
    )
}

/// Result type alias for the OMS pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
