//! Blob store abstraction.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::StoreResult;
use crate::models::{BlobItem, BlobProperties, DeleteReceipt, UploadOptions, UploadReceipt};

/// Stream of content chunks produced by a download.
pub type ChunkStream = BoxStream<'static, StoreResult<Bytes>>;

/// An in-progress blob download.
pub struct BlobDownload {
    /// Store-reported properties of the blob.
    pub properties: BlobProperties,
    /// Content, delivered in store-sized chunks.
    pub body: ChunkStream,
}

/// Operations on a single fixed container.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the name of the bound container.
    fn container(&self) -> &str;

    /// Creates the bound container. Fails with `AlreadyExists` if present.
    async fn create_container(&self) -> StoreResult<()>;

    /// Uploads `data` under `name`, replacing any existing blob.
    async fn upload(
        &self,
        name: &str,
        data: Bytes,
        options: UploadOptions,
    ) -> StoreResult<UploadReceipt>;

    /// Starts downloading the named blob.
    async fn download(&self, name: &str) -> StoreResult<BlobDownload>;

    /// Lists every blob in the container, following continuation.
    async fn list(&self) -> StoreResult<Vec<BlobItem>>;

    /// Deletes the named blob together with its snapshots.
    async fn delete(&self, name: &str) -> StoreResult<DeleteReceipt>;
}
