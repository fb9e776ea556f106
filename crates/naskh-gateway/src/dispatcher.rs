//! Mirror Dispatcher
//!
//! Maps one storage notification to exactly one idempotent operation against
//! the backup store. Stateless: every entry point normalizes its payload,
//! derives the path(s) and issues a single remote call. Nothing is retried
//! or queued here; failed operations are logged and returned to the boundary
//! so the delivery platform's own retry policy takes over.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info, warn};

use naskh_core::types::{
    CreatedEventData, DeletedEventData, MirrorOperation, ObjectKind, RenamedEventData,
};
use naskh_core::utils::path_from_url;
use naskh_core::Result;
use naskh_dfs::MirrorStore;

pub struct MirrorDispatcher<S: MirrorStore + ?Sized> {
    store: Arc<S>,
}

impl<S: MirrorStore + ?Sized> MirrorDispatcher<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Mirror a file-created event. `content` is the object's bytes as read
    /// from the source account; `None` means the object was already gone,
    /// which completes as a no-op.
    pub async fn file_created(&self, data: &Value, content: Option<Bytes>) -> Result<()> {
        let event = CreatedEventData::parse(data)?;

        let Some(content) = content else {
            info!(url = %event.url, "file-created event carried no content, skipping");
            return Ok(());
        };

        let path = path_from_url(&event.url);
        self.execute(MirrorOperation::Upload { path, content }).await
    }

    pub async fn file_renamed(&self, data: &Value) -> Result<()> {
        let event = RenamedEventData::parse(data)?;

        self.execute(MirrorOperation::Rename {
            kind: ObjectKind::File,
            source: path_from_url(&event.source_url),
            destination: path_from_url(&event.destination_url),
        })
        .await
    }

    pub async fn file_deleted(&self, data: &Value) -> Result<()> {
        let event = DeletedEventData::parse(data)?;

        self.execute(MirrorOperation::Delete {
            kind: ObjectKind::File,
            path: path_from_url(&event.url),
        })
        .await
    }

    pub async fn directory_created(&self, data: &Value) -> Result<()> {
        let event = CreatedEventData::parse(data)?;

        self.execute(MirrorOperation::CreateDirectory {
            path: path_from_url(&event.url),
        })
        .await
    }

    pub async fn directory_renamed(&self, data: &Value) -> Result<()> {
        let event = RenamedEventData::parse(data)?;

        self.execute(MirrorOperation::Rename {
            kind: ObjectKind::Directory,
            source: path_from_url(&event.source_url),
            destination: path_from_url(&event.destination_url),
        })
        .await
    }

    pub async fn directory_deleted(&self, data: &Value) -> Result<()> {
        let event = DeletedEventData::parse(data)?;

        self.execute(MirrorOperation::Delete {
            kind: ObjectKind::Directory,
            path: path_from_url(&event.url),
        })
        .await
    }

    /// Execute a derived operation: one remote call.
    async fn execute(&self, op: MirrorOperation) -> Result<()> {
        debug!(%op, "executing mirror operation");

        let result = match &op {
            MirrorOperation::Upload { path, content } => {
                self.store.upload(path, content.clone(), true).await
            }
            MirrorOperation::Rename {
                kind: ObjectKind::File,
                source,
                destination,
            } => self.store.rename_file(source, destination).await,
            MirrorOperation::Rename {
                kind: ObjectKind::Directory,
                source,
                destination,
            } => self.store.rename_directory(source, destination).await,
            MirrorOperation::Delete {
                kind: ObjectKind::File,
                path,
            } => self.store.delete_file(path).await,
            MirrorOperation::Delete {
                kind: ObjectKind::Directory,
                path,
            } => self.store.delete_directory(path).await,
            MirrorOperation::CreateDirectory { path } => self.store.create_directory(path).await,
        };

        if let Err(e) = &result {
            warn!(%op, error = %e, "mirror operation failed");
        }

        result
    }
}
