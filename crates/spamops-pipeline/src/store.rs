//! Object store access for raw and processed data
//!
//! Locations are plain filesystem paths or `s3://bucket/key` URIs; the same
//! store handles both so pipeline code never branches on the scheme.

use anyhow::{anyhow, Context, Result};
use aws_sdk_s3::{primitives::ByteStream, Client};
use spamops_common::hashing::sha256_hex;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// A parsed storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    S3 { bucket: String, key: String },
}

/// Parse a location string into its storage backend form.
///
/// `s3://bucket/key` URIs address object storage; everything else is treated
/// as a local filesystem path.
pub fn parse_location(uri: &str) -> Result<Location> {
    if let Some(rest) = uri.strip_prefix("s3://") {
        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| anyhow!("S3 URI has no key component: {uri}"))?;
        if bucket.is_empty() || key.is_empty() {
            return Err(anyhow!("Invalid S3 URI: {uri}"));
        }
        return Ok(Location::S3 {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
    }
    Ok(Location::Local(PathBuf::from(uri)))
}

/// Result of a completed write.
#[derive(Debug, Clone)]
pub struct PutResult {
    pub location: String,
    pub checksum: String,
    pub size: u64,
}

/// Storage client spanning local paths and S3 objects.
///
/// The S3 client is created lazily on the first `s3://` access, so purely
/// local runs need no AWS credentials.
#[derive(Default)]
pub struct DataStore {
    s3: OnceCell<Client>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn s3_client(&self) -> &Client {
        self.s3
            .get_or_init(|| async {
                let config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                info!("S3 storage client initialized");
                Client::new(&config)
            })
            .await
    }

    /// Read the full contents of a location.
    pub async fn get(&self, uri: &str) -> Result<Vec<u8>> {
        match parse_location(uri)? {
            Location::Local(path) => {
                debug!("Reading local file {}", path.display());
                tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))
            },
            Location::S3 { bucket, key } => {
                debug!("Downloading from s3://{}/{}", bucket, key);
                let response = self
                    .s3_client()
                    .await
                    .get_object()
                    .bucket(&bucket)
                    .key(&key)
                    .send()
                    .await
                    .with_context(|| format!("Failed to download s3://{bucket}/{key}"))?;

                let data = response
                    .body
                    .collect()
                    .await
                    .context("Failed to read S3 response body")?
                    .into_bytes()
                    .to_vec();

                debug!("Downloaded {} bytes from s3://{}/{}", data.len(), bucket, key);
                Ok(data)
            },
        }
    }

    /// Write a byte buffer to a location.
    ///
    /// Local destinations get their parent directory created first; S3
    /// destinations need no pre-creation.
    pub async fn put(&self, uri: &str, data: Vec<u8>) -> Result<PutResult> {
        let checksum = sha256_hex(&data);
        let size = data.len() as u64;

        match parse_location(uri)? {
            Location::Local(path) => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.with_context(|| {
                        format!("Failed to create directory {}", parent.display())
                    })?;
                }
                tokio::fs::write(&path, data)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {} bytes to {}", size, path.display());
            },
            Location::S3 { bucket, key } => {
                self.s3_client()
                    .await
                    .put_object()
                    .bucket(&bucket)
                    .key(&key)
                    .body(ByteStream::from(data))
                    .send()
                    .await
                    .with_context(|| format!("Failed to upload s3://{bucket}/{key}"))?;
                info!("Uploaded {} bytes to s3://{}/{}", size, bucket, key);
            },
        }

        Ok(PutResult {
            location: uri.to_string(),
            checksum,
            size,
        })
    }

    /// Check whether a location currently holds an object.
    pub async fn exists(&self, uri: &str) -> Result<bool> {
        match parse_location(uri)? {
            Location::Local(path) => Ok(Path::new(&path).exists()),
            Location::S3 { bucket, key } => {
                match self
                    .s3_client()
                    .await
                    .head_object()
                    .bucket(&bucket)
                    .key(&key)
                    .send()
                    .await
                {
                    Ok(_) => Ok(true),
                    Err(e) => {
                        if e.to_string().contains("NotFound") || e.to_string().contains("404") {
                            Ok(false)
                        } else {
                            Err(anyhow!("Failed to check s3://{bucket}/{key}: {e}"))
                        }
                    },
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_s3_uris() {
        let location = parse_location("s3://my-bucket/data/processed/abc/data.parquet").unwrap();
        assert_eq!(
            location,
            Location::S3 {
                bucket: "my-bucket".to_string(),
                key: "data/processed/abc/data.parquet".to_string(),
            }
        );
    }

    #[test]
    fn rejects_s3_uris_without_key() {
        assert!(parse_location("s3://only-bucket").is_err());
        assert!(parse_location("s3://bucket/").is_err());
    }

    #[test]
    fn treats_plain_paths_as_local() {
        let location = parse_location("./data/spam.csv").unwrap();
        assert_eq!(location, Location::Local(PathBuf::from("./data/spam.csv")));
    }

    #[tokio::test]
    async fn local_round_trip_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("nested/abc123/data.bin")
            .to_string_lossy()
            .to_string();

        let store = DataStore::new();
        assert!(!store.exists(&path).await.unwrap());

        let result = store.put(&path, b"payload".to_vec()).await.unwrap();
        assert_eq!(result.size, 7);
        assert!(store.exists(&path).await.unwrap());
        assert_eq!(store.get(&path).await.unwrap(), b"payload");
    }
}
