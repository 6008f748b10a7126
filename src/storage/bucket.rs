//! Bucket access (S3, R2, GCS, Azure, local filesystem)

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::fmt;
use std::sync::Arc;

/// Directory to list for a raw key prefix
///
/// `object_store` lists by whole path segments, so a prefix ending in a
/// partial segment (`mesh-info/dt=`) is listed from its parent directory
/// and filtered afterwards.
pub fn listing_root(prefix: &str) -> Option<&str> {
    prefix
        .rsplit_once('/')
        .map(|(dir, _)| dir.trim_end_matches('/'))
        .filter(|dir| !dir.is_empty())
}

/// A named bucket
#[derive(Clone)]
pub struct Bucket {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Bucket / container name (or local root)
    name: String,
    /// URL scheme for display (s3, r2, gs, az, file, memory)
    scheme: String,
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("name", &self.name)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl Bucket {
    /// Wrap an existing object store
    pub fn new(
        scheme: impl Into<String>,
        name: impl Into<String>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            store,
            name: name.into(),
            scheme: scheme.into(),
        }
    }

    /// In-memory bucket
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::new(
            "memory",
            name,
            Arc::new(object_store::memory::InMemory::new()),
        )
    }

    /// Open a bucket from a job parameter
    ///
    /// Supported formats:
    /// - `my-bucket` - AWS S3 bucket name
    /// - `s3://bucket` - AWS S3
    /// - `r2://bucket` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket` - Google Cloud Storage
    /// - `az://container` - Azure Blob Storage
    /// - `file:///local/path`, `/local/path` or `./path` - Local filesystem
    pub fn open(location: &str) -> Result<Self> {
        if let Some(rest) = location.strip_prefix("s3://") {
            Self::open_s3(rest, false)
        } else if let Some(rest) = location.strip_prefix("r2://") {
            Self::open_s3(rest, true)
        } else if let Some(rest) = location.strip_prefix("gs://") {
            Self::open_gcs(rest)
        } else if let Some(rest) = location.strip_prefix("az://") {
            Self::open_azure(rest)
        } else if let Some(rest) = location.strip_prefix("file://") {
            Self::open_local(rest)
        } else if location.starts_with('/') || location.starts_with('.') {
            Self::open_local(location)
        } else {
            Self::open_s3(location, false)
        }
    }

    fn bucket_name(rest: &str, scheme: &str) -> Result<String> {
        let name = rest.trim_end_matches('/');
        if name.is_empty() || name.contains('/') {
            return Err(Error::config(format!(
                "Invalid {scheme} bucket '{rest}': expected a bare bucket name"
            )));
        }
        Ok(name.to_string())
    }

    /// Open an S3 or R2 bucket
    fn open_s3(rest: &str, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let bucket = Self::bucket_name(rest, scheme)?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&bucket);

        // R2 endpoint: https://<account_id>.r2.cloudflarestorage.com
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self::new(scheme, bucket, Arc::new(store)))
    }

    /// Open a GCS bucket
    fn open_gcs(rest: &str) -> Result<Self> {
        let bucket = Self::bucket_name(rest, "gs")?;
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(&bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self::new("gs", bucket, Arc::new(store)))
    }

    /// Open an Azure Blob container
    fn open_azure(rest: &str) -> Result<Self> {
        let container = Self::bucket_name(rest, "az")?;
        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(&container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self::new("az", container, Arc::new(store)))
    }

    /// Open a local directory as a bucket
    fn open_local(path: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self::new(
            "file",
            path.trim_end_matches('/'),
            Arc::new(store),
        ))
    }

    /// Bucket name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scheme (s3, r2, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Full URL of a key, e.g. `s3://bucket/mesh-info/dt=2023-01-01/a.csv`
    pub fn url(&self, key: &str) -> String {
        format!("{}://{}/{key}", self.scheme, self.name)
    }

    /// Object path of a raw key
    ///
    /// Keys are taken verbatim, so a listed key reads back the same object.
    /// Empty segments and `.`/`..` are rejected.
    fn object_path(&self, key: &str) -> Result<ObjectPath> {
        ObjectPath::parse(key)
            .map_err(|e| Error::storage(format!("Invalid object key {}: {e}", self.url(key))))
    }

    /// List every key starting with the raw string `prefix`, sorted
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let root = listing_root(prefix)
            .map(|dir| self.object_path(dir))
            .transpose()?;

        let objects: Vec<_> = self
            .store
            .list(root.as_ref())
            .try_collect()
            .await
            .map_err(|e| Error::storage(format!("Failed to list {}: {e}", self.url(prefix))))?;

        // local listings come back in directory order
        let mut keys: Vec<String> = objects
            .into_iter()
            .map(|meta| meta.location.to_string())
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Read an object
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.object_path(key)?;
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| Error::storage(format!("Failed to read {}: {e}", self.url(key))))?;

        result
            .bytes()
            .await
            .map_err(|e| Error::storage(format!("Failed to read {}: {e}", self.url(key))))
    }

    /// Write an object, returning its URL for logging
    pub async fn put(&self, key: &str, data: Bytes) -> Result<String> {
        let path = self.object_path(key)?;
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::storage(format!("Failed to write {}: {e}", self.url(key))))?;

        Ok(self.url(key))
    }
}
