//! Blob store backed by `azure_storage_blobs`.

use async_trait::async_trait;
use azure_core::request_options::Metadata;
use azure_storage_blobs::blob::{Blob, BlobProperties as ServiceBlobProperties};
use azure_storage_blobs::prelude::*;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{future, stream, StreamExt, TryStreamExt};
use tracing::debug;

use super::connection::ConnectionString;
use super::{cloud_location, credentials, store_error};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    is_contained_blob_name, BlobItem, BlobProperties, DeleteReceipt, UploadOptions,
    UploadReceipt,
};
use crate::storage::blob::{BlobDownload, BlobStore};

/// Blob store bound to one container of a storage account.
pub struct AzureBlobStore {
    client: ContainerClient,
    container: String,
}

impl AzureBlobStore {
    pub fn new(connection: &ConnectionString, container: impl Into<String>) -> Self {
        let container = container.into();
        let client = ClientBuilder::with_location(
            cloud_location(connection, &connection.blob_endpoint),
            credentials(connection),
        )
        .container_client(container.clone());

        Self { client, container }
    }

    /// Returns a client for a blob of the bound container.
    fn blob_client(&self, name: &str) -> StoreResult<BlobClient> {
        if !is_contained_blob_name(name) {
            return Err(StoreError::BadInput(format!(
                "blob name {} leaves container {}",
                name, self.container
            )));
        }
        Ok(self.client.blob_client(name))
    }
}

/// Converts the SDK's timestamp into the crate's clock type.
fn to_utc(at: time::OffsetDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(at.unix_timestamp(), at.nanosecond()).unwrap_or_else(Utc::now)
}

fn properties(service: &ServiceBlobProperties) -> BlobProperties {
    BlobProperties {
        content_type: service.content_type.clone(),
        content_length: service.content_length,
        etag: service.etag.to_string(),
        last_modified: to_utc(service.last_modified),
    }
}

fn item(blob: &Blob) -> BlobItem {
    BlobItem {
        name: blob.name.clone(),
        properties: properties(&blob.properties),
    }
}

/// Metadata sent with every upload, names kept exactly as given.
pub fn upload_metadata(options: &UploadOptions) -> Metadata {
    let mut metadata = Metadata::new();
    for (name, value) in &options.metadata {
        metadata.insert(name.clone(), value.clone());
    }
    metadata
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    fn container(&self) -> &str {
        &self.container
    }

    async fn create_container(&self) -> StoreResult<()> {
        self.client.create().await.map_err(store_error)
    }

    async fn upload(
        &self,
        name: &str,
        data: Bytes,
        options: UploadOptions,
    ) -> StoreResult<UploadReceipt> {
        let blob = self.blob_client(name)?;
        let url = blob.url().map_err(store_error)?;
        debug!("PUT {}", url);

        let response = blob
            .put_block_blob(data)
            .content_type(options.content_type.clone())
            .metadata(upload_metadata(&options))
            .await
            .map_err(store_error)?;

        Ok(UploadReceipt {
            request_id: Some(response.request_id.to_string()),
            etag: response.etag.to_string(),
            last_modified: to_utc(response.last_modified),
            url: url.to_string(),
        })
    }

    async fn download(&self, name: &str) -> StoreResult<BlobDownload> {
        let mut chunks = self.blob_client(name)?.get().into_stream();

        // The first chunk carries the blob's properties.
        let first = match chunks.next().await {
            Some(chunk) => chunk.map_err(store_error)?,
            None => return Err(StoreError::NotFound),
        };
        let properties = properties(&first.blob.properties);
        let head = first.data.collect().await.map_err(store_error)?;

        let rest = chunks.then(|chunk| async move {
            match chunk {
                Ok(chunk) => chunk.data.collect().await.map_err(store_error),
                Err(e) => Err(store_error(e)),
            }
        });
        let body = stream::once(future::ready(Ok(head))).chain(rest).boxed();

        Ok(BlobDownload { properties, body })
    }

    async fn list(&self) -> StoreResult<Vec<BlobItem>> {
        let pages: Vec<_> = self
            .client
            .list_blobs()
            .into_stream()
            .map_err(store_error)
            .try_collect()
            .await?;

        Ok(pages
            .iter()
            .flat_map(|page| page.blobs.blobs().map(item))
            .collect())
    }

    async fn delete(&self, name: &str) -> StoreResult<DeleteReceipt> {
        let response = self
            .blob_client(name)?
            .delete()
            .delete_snapshots_method(DeleteSnapshotsMethod::Include)
            .await
            .map_err(store_error)?;

        Ok(DeleteReceipt {
            request_id: Some(response.request_id.to_string()),
        })
    }
}
