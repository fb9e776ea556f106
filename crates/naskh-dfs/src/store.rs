//! The store seam between dispatcher and storage backend

use async_trait::async_trait;
use bytes::Bytes;

use naskh_core::Result;

use crate::client::DataLakeClient;

/// Destination-store operations the dispatcher performs.
///
/// Paths are slash-prefixed logical object paths as derived from event URLs;
/// deletes have delete-if-exists semantics.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    async fn upload(&self, path: &str, data: Bytes, overwrite: bool) -> Result<()>;

    async fn rename_file(&self, source: &str, destination: &str) -> Result<()>;

    async fn rename_directory(&self, source: &str, destination: &str) -> Result<()>;

    async fn create_directory(&self, path: &str) -> Result<()>;

    async fn delete_file(&self, path: &str) -> Result<()>;

    async fn delete_directory(&self, path: &str) -> Result<()>;
}

/// A `DataLakeClient` bound to the destination backup filesystem
pub struct BackupStore {
    client: DataLakeClient,
    filesystem: String,
}

impl BackupStore {
    pub fn new(client: DataLakeClient, filesystem: impl Into<String>) -> Self {
        Self {
            client,
            filesystem: filesystem.into(),
        }
    }

    pub fn filesystem(&self) -> &str {
        &self.filesystem
    }
}

#[async_trait]
impl MirrorStore for BackupStore {
    async fn upload(&self, path: &str, data: Bytes, overwrite: bool) -> Result<()> {
        self.client
            .upload(&self.filesystem, path, data, overwrite)
            .await
    }

    async fn rename_file(&self, source: &str, destination: &str) -> Result<()> {
        self.client
            .rename_file(&self.filesystem, source, destination)
            .await
    }

    async fn rename_directory(&self, source: &str, destination: &str) -> Result<()> {
        self.client
            .rename_directory(&self.filesystem, source, destination)
            .await
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        self.client.create_directory(&self.filesystem, path).await
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        self.client.delete_file(&self.filesystem, path).await
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        self.client.delete_directory(&self.filesystem, path).await
    }
}
