//! Object storage seam: server-side copy and version listing.
//!
//! Production uses the S3 API. Both operations are single-attempt; a failure
//! is terminal for the invocation that issued it.

use std::{future::Future, pin::Pin};

use gantry_core::{error::Result, ArtifactLocation, ConfigVersion, GantryError};
use tracing::debug;

/// Storage operations required by the promotion and rollback handlers.
///
/// Listing preserves the storage service's native ordering (typically
/// most-recent-first); callers must not re-sort.
pub trait ObjectStore: Send + Sync + 'static {
    /// Copies one object server-side from `source` to `destination`.
    ///
    /// Overwrites any existing object at the destination, which is what
    /// makes re-invoking a promotion for the same job a no-op beyond the
    /// overwrite itself.
    fn copy_object(
        &self,
        source: ArtifactLocation,
        destination: ArtifactLocation,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Lists all stored versions of the configuration object under the
    /// given bucket and key prefix.
    fn list_config_versions(
        &self,
        bucket: String,
        prefix: String,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ConfigVersion>>> + Send + '_>>;
}

/// Production object store backed by the S3 API.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Creates a new adapter around a configured S3 client.
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

impl ObjectStore for S3ObjectStore {
    fn copy_object(
        &self,
        source: ArtifactLocation,
        destination: ArtifactLocation,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let client = self.client.clone();
        Box::pin(async move {
            debug!(
                source = %source.copy_source(),
                destination = %destination.copy_source(),
                "issuing server-side copy"
            );
            client
                .copy_object()
                .copy_source(source.copy_source())
                .bucket(destination.bucket_name)
                .key(destination.object_key)
                .send()
                .await
                .map_err(|e| GantryError::copy_failed(e.to_string()))?;
            Ok(())
        })
    }

    fn list_config_versions(
        &self,
        bucket: String,
        prefix: String,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ConfigVersion>>> + Send + '_>> {
        let client = self.client.clone();
        Box::pin(async move {
            let output = client
                .list_object_versions()
                .bucket(bucket)
                .prefix(prefix)
                .send()
                .await
                .map_err(|e| GantryError::list_versions_failed(e.to_string()))?;

            // Entries without an id or timestamp cannot be offered for
            // rollback; skip them rather than failing the whole listing.
            let versions = output
                .versions()
                .iter()
                .filter_map(|v| {
                    let version_id = v.version_id()?;
                    let millis = v.last_modified().copied()?.to_millis().ok()?;
                    let last_modified = chrono::DateTime::from_timestamp_millis(millis)?;
                    Some(ConfigVersion::new(version_id, last_modified))
                })
                .collect::<Vec<_>>();

            debug!(listed = versions.len(), "configuration versions listed");
            Ok(versions)
        })
    }
}

pub mod mock {
    //! In-memory object store for testing handler logic.

    use std::sync::Arc;

    use tokio::sync::RwLock;

    use super::{ArtifactLocation, ConfigVersion, GantryError, ObjectStore, Result};
    use std::{future::Future, pin::Pin};

    /// Recorded server-side copy.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CopyRecord {
        /// Source location of the copy.
        pub source: ArtifactLocation,
        /// Destination location of the copy.
        pub destination: ArtifactLocation,
    }

    /// Mock object store with configurable versions and injectable failures.
    ///
    /// Injected errors persist across calls so repeated identical requests
    /// observe identical behavior.
    #[derive(Debug, Default)]
    pub struct MockObjectStore {
        copies: Arc<RwLock<Vec<CopyRecord>>>,
        versions: Arc<RwLock<Vec<ConfigVersion>>>,
        copy_error: Arc<RwLock<Option<String>>>,
        list_error: Arc<RwLock<Option<String>>>,
    }

    impl MockObjectStore {
        /// Creates an empty mock store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Replaces the version listing returned by the mock.
        pub async fn set_versions(&self, versions: Vec<ConfigVersion>) {
            *self.versions.write().await = versions;
        }

        /// Makes every subsequent copy fail with the given message.
        pub async fn inject_copy_error(&self, message: impl Into<String>) {
            *self.copy_error.write().await = Some(message.into());
        }

        /// Makes every subsequent listing fail with the given message.
        pub async fn inject_list_error(&self, message: impl Into<String>) {
            *self.list_error.write().await = Some(message.into());
        }

        /// Returns all copies issued so far, in order.
        pub async fn recorded_copies(&self) -> Vec<CopyRecord> {
            self.copies.read().await.clone()
        }
    }

    impl ObjectStore for MockObjectStore {
        fn copy_object(
            &self,
            source: ArtifactLocation,
            destination: ArtifactLocation,
        ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            let copies = self.copies.clone();
            let copy_error = self.copy_error.clone();
            Box::pin(async move {
                if let Some(message) = copy_error.read().await.clone() {
                    return Err(GantryError::copy_failed(message));
                }
                copies.write().await.push(CopyRecord { source, destination });
                Ok(())
            })
        }

        fn list_config_versions(
            &self,
            _bucket: String,
            _prefix: String,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<ConfigVersion>>> + Send + '_>> {
            let versions = self.versions.clone();
            let list_error = self.list_error.clone();
            Box::pin(async move {
                if let Some(message) = list_error.read().await.clone() {
                    return Err(GantryError::list_versions_failed(message));
                }
                Ok(versions.read().await.clone())
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use gantry_core::{ArtifactLocation, ConfigVersion};

    use super::{mock::MockObjectStore, ObjectStore};

    #[tokio::test]
    async fn mock_records_copies_in_order() {
        let store = MockObjectStore::new();
        let source = ArtifactLocation::new("src", "a.zip");
        let destination = ArtifactLocation::new("dst", "a.zip");

        store.copy_object(source.clone(), destination.clone()).await.unwrap();

        let copies = store.recorded_copies().await;
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].source, source);
        assert_eq!(copies[0].destination, destination);
    }

    #[tokio::test]
    async fn mock_copy_error_is_persistent() {
        let store = MockObjectStore::new();
        store.inject_copy_error("access denied").await;

        let source = ArtifactLocation::new("src", "a.zip");
        let destination = ArtifactLocation::new("dst", "a.zip");

        assert!(store.copy_object(source.clone(), destination.clone()).await.is_err());
        assert!(store.copy_object(source, destination).await.is_err());
        assert!(store.recorded_copies().await.is_empty());
    }

    #[tokio::test]
    async fn mock_preserves_listing_order() {
        let store = MockObjectStore::new();
        let newer = ConfigVersion::new("v2", Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
        let older = ConfigVersion::new("v1", Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        store.set_versions(vec![newer.clone(), older.clone()]).await;

        let listed = store
            .list_config_versions("bucket".to_string(), "prefix".to_string())
            .await
            .unwrap();
        assert_eq!(listed, vec![newer, older]);
    }
}
