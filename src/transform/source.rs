//! Reading raw JSON events from a storage location

use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use crate::types::JsonValue;
use tracing::debug;

/// Events read from a source location
#[derive(Debug, Clone, Default)]
pub struct SourceEvents {
    /// Keys of the files that were read, relative to the source
    pub files: Vec<String>,
    /// Every JSON value found, in file order
    pub events: Vec<JsonValue>,
}

/// Whether any segment of a key is hidden (`_name` or `.name`)
pub fn is_hidden(key: &str) -> bool {
    key.split('/')
        .any(|segment| segment.starts_with('_') || segment.starts_with('.'))
}

/// Parse every JSON value in a file
///
/// Accepts a single document, JSON Lines, or concatenated values.
pub fn parse_events(path: &str, data: &[u8]) -> Result<Vec<JsonValue>> {
    serde_json::Deserializer::from_slice(data)
        .into_iter::<JsonValue>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::malformed(path, e.to_string()))
}

/// Read every visible file below `source` as one logical table
///
/// The listing is recursive: files in nested directories such as
/// `raw/events/2025/03/01/` are read along with top-level ones. A segment
/// starting with `_` or `.` hides everything beneath it.
///
/// Fails with [`Error::EmptySource`] when no visible file is found, so a
/// mistyped or empty source never reaches the overwriting writer.
pub async fn read_events(source: &StorageLocation) -> Result<SourceEvents> {
    let mut result = SourceEvents::default();

    for key in source.list().await? {
        if is_hidden(&key) {
            debug!("Skipping hidden object {}", key);
            continue;
        }

        let data = source.get(&key).await?;
        let events = parse_events(&source.display_path(&key), &data)?;
        debug!("Read {} events from {}", events.len(), key);

        result.events.extend(events);
        result.files.push(key);
    }

    if result.files.is_empty() {
        return Err(Error::empty_source(source.display_path("")));
    }
    Ok(result)
}
