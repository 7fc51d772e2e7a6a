//! Object storage locations (S3, R2, GCS, Azure, local, memory)
//!
//! Both the generator's event archive and the transform job's source and
//! target are addressed as a store plus a key prefix.

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::fmt;
use std::sync::Arc;

/// A store plus a key prefix within it
#[derive(Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// URL scheme (s3, r2, gs, az, file, memory)
    scheme: String,
    /// Bucket, container or local root, for display
    authority: String,
}

impl StorageLocation {
    /// Parse a location URL and create the appropriate object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `memory://path/` - Process-local in-memory store
    /// - `/local/path/`, `./path/` or `file:///path/` - Local filesystem
    pub fn parse(url: &str) -> Result<Self> {
        if url.starts_with("s3://") {
            Self::parse_s3(url, false)
        } else if url.starts_with("r2://") {
            Self::parse_s3(url, true)
        } else if url.starts_with("gs://") {
            Self::parse_gcs(url)
        } else if url.starts_with("az://") {
            Self::parse_azure(url)
        } else if let Some(prefix) = url.strip_prefix("memory://") {
            Ok(Self::in_memory(prefix))
        } else {
            Self::parse_local(url)
        }
    }

    /// Parse a location that will be written to
    ///
    /// Same as [`parse`](Self::parse), but a local directory is created
    /// first when it does not exist yet.
    pub fn parse_or_create(url: &str) -> Result<Self> {
        if let Some(path) = Self::local_path(url) {
            if !path.is_empty() {
                std::fs::create_dir_all(path).map_err(|e| {
                    Error::config(format!("Failed to create directory {path}: {e}"))
                })?;
            }
        }
        Self::parse(url)
    }

    /// The filesystem path of a local URL, `None` for any other scheme
    fn local_path(url: &str) -> Option<&str> {
        let remote = ["s3://", "r2://", "gs://", "az://", "memory://"];
        if remote.iter().any(|scheme| url.starts_with(scheme)) {
            None
        } else {
            Some(url.strip_prefix("file://").unwrap_or(url))
        }
    }

    /// An S3 bucket in an explicit region, rooted at the bucket
    pub fn s3_bucket(bucket: &str, region: &str) -> Result<Self> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region)
            .build()
            .map_err(|e| Error::config(format!("Failed to create s3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "s3".to_string(),
            authority: bucket.to_string(),
        })
    }

    /// A fresh in-memory store
    pub fn in_memory(prefix: &str) -> Self {
        Self::from_store(Arc::new(InMemory::new()), prefix, "memory")
    }

    /// Wrap an existing store
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: &str, scheme: &str) -> Self {
        Self {
            store,
            prefix: prefix.trim_matches('/').to_string(),
            scheme: scheme.to_string(),
            authority: String::new(),
        }
    }

    /// Split `bucket/some/prefix` into bucket and prefix
    fn split_authority(without_scheme: &str) -> (&str, String) {
        match without_scheme.find('/') {
            Some(idx) => (
                &without_scheme[..idx],
                without_scheme[idx + 1..].trim_matches('/').to_string(),
            ),
            None => (without_scheme, String::new()),
        }
    }

    /// Parse S3 or R2 URL
    fn parse_s3(url: &str, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let without_scheme = url
            .strip_prefix(&format!("{scheme}://"))
            .ok_or_else(|| Error::config(format!("Invalid {scheme} URL: {url}")))?;

        let (bucket, prefix) = Self::split_authority(without_scheme);
        if bucket.is_empty() {
            return Err(Error::config(format!("Missing bucket in URL: {url}")));
        }

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // R2 needs an account endpoint; AWS_ENDPOINT is already read by from_env()
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
            authority: bucket.to_string(),
        })
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str) -> Result<Self> {
        let without_scheme = url
            .strip_prefix("gs://")
            .ok_or_else(|| Error::config(format!("Invalid GCS URL: {url}")))?;

        let (bucket, prefix) = Self::split_authority(without_scheme);

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
            authority: bucket.to_string(),
        })
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str) -> Result<Self> {
        let without_scheme = url
            .strip_prefix("az://")
            .ok_or_else(|| Error::config(format!("Invalid Azure URL: {url}")))?;

        let (container, prefix) = Self::split_authority(without_scheme);

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
            authority: container.to_string(),
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);
        if path.is_empty() {
            return Err(Error::config("Empty storage path"));
        }

        if !std::path::Path::new(path).is_dir() {
            return Err(Error::config(format!("Path does not exist: {path}")));
        }

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
            authority: path.trim_end_matches('/').to_string(),
        })
    }

    /// Get the scheme (s3, r2, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the key prefix within the store
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A location nested below this one in the same store
    pub fn child(&self, sub: &str) -> Self {
        let sub = sub.trim_matches('/');
        let prefix = if self.prefix.is_empty() {
            sub.to_string()
        } else if sub.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}/{sub}", self.prefix)
        };

        Self {
            store: Arc::clone(&self.store),
            prefix,
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
        }
    }

    /// Full object path for a key relative to the prefix
    fn object_path(&self, key: &str) -> ObjectPath {
        if self.prefix.is_empty() {
            ObjectPath::from(key)
        } else {
            ObjectPath::from(format!("{}/{key}", self.prefix))
        }
    }

    /// Human-readable URL for a key, for logs and reports
    pub fn display_path(&self, key: &str) -> String {
        let path = self.object_path(key);
        match self.scheme.as_str() {
            "file" => format!("{}/{path}", self.authority),
            _ if self.authority.is_empty() => format!("{}://{path}", self.scheme),
            _ => format!("{}://{}/{path}", self.scheme, self.authority),
        }
    }

    /// Write bytes to a key, replacing any existing object
    pub async fn put(&self, key: &str, data: Bytes) -> Result<String> {
        let path = self.object_path(key);
        self.store.put(&path, data.into()).await?;
        Ok(self.display_path(key))
    }

    /// Read the whole object at a key
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.object_path(key);
        let bytes = self.store.get(&path).await?.bytes().await?;
        Ok(bytes)
    }

    /// Delete the object at a key
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key);
        self.store.delete(&path).await?;
        Ok(())
    }

    /// List every key below the prefix (recursively), relative and sorted
    pub async fn list(&self) -> Result<Vec<String>> {
        let prefix = (!self.prefix.is_empty()).then(|| ObjectPath::from(self.prefix.as_str()));

        let listed = match self
            .store
            .list(prefix.as_ref())
            .try_collect::<Vec<_>>()
            .await
        {
            Ok(listed) => listed,
            Err(object_store::Error::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let strip = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.prefix)
        };

        let mut keys: Vec<String> = listed
            .into_iter()
            .map(|meta| {
                let full = meta.location.to_string();
                full.strip_prefix(&strip).map_or(full.clone(), str::to_string)
            })
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl fmt::Debug for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageLocation")
            .field("scheme", &self.scheme)
            .field("authority", &self.authority)
            .field("prefix", &self.prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().to_str().unwrap();
        let location = StorageLocation::parse(path).unwrap();
        assert_eq!(location.scheme(), "file");
    }

    #[test]
    fn test_parse_missing_local_path_is_not_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("raw_typo");

        let err = StorageLocation::parse(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(!missing.exists());
    }

    #[test]
    fn test_parse_or_create_local_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("processed/orders");
        let url = format!("file://{}", target.display());

        let location = StorageLocation::parse_or_create(&url).unwrap();
        assert_eq!(location.scheme(), "file");
        assert!(target.is_dir());
    }

    #[test]
    fn test_parse_memory_prefix() {
        let location = StorageLocation::parse("memory://raw/events/").unwrap();
        assert_eq!(location.scheme(), "memory");
        assert_eq!(location.prefix(), "raw/events");
        assert_eq!(
            location.display_path("a.json"),
            "memory://raw/events/a.json"
        );
    }

    #[test]
    fn test_parse_s3_missing_bucket() {
        assert!(StorageLocation::parse("s3://").is_err());
    }

    #[test]
    fn test_child_prefix() {
        let root = StorageLocation::in_memory("");
        let child = root.child("/processed/orders/");
        assert_eq!(child.prefix(), "processed/orders");
        assert_eq!(child.child("").prefix(), "processed/orders");
        assert_eq!(child.child("_catalog").prefix(), "processed/orders/_catalog");
    }

    #[tokio::test]
    async fn test_put_list_get_delete() {
        let root = StorageLocation::in_memory("");
        let events = root.child("raw/events");

        events
            .put("b.json", Bytes::from_static(b"{}"))
            .await
            .unwrap();
        events
            .put("a.json", Bytes::from_static(b"{\"x\":1}"))
            .await
            .unwrap();
        root.put("other/c.json", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        assert_eq!(events.list().await.unwrap(), vec!["a.json", "b.json"]);
        assert_eq!(
            events.get("a.json").await.unwrap(),
            Bytes::from_static(b"{\"x\":1}")
        );

        events.delete("a.json").await.unwrap();
        assert_eq!(events.list().await.unwrap(), vec!["b.json"]);
        assert_eq!(root.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_missing_local_prefix_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = StorageLocation::parse(temp_dir.path().to_str().unwrap()).unwrap();
        let missing = root.child("does/not/exist");
        assert!(missing.list().await.unwrap().is_empty());
    }
}
