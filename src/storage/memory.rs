//! In-memory blob and table stores.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::blob::{BlobDownload, BlobStore};
use super::table::TableStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    new_etag, BlobItem, BlobProperties, DeleteReceipt, UploadOptions, UploadReceipt, UserEntity,
};

/// Size of the chunks a download is streamed in.
const CHUNK_SIZE: usize = 64 * 1024;

/// A stored blob.
#[derive(Debug, Clone)]
struct StoredBlob {
    data: Bytes,
    properties: BlobProperties,
}

/// In-memory implementation of the blob store.
pub struct MemoryBlobStore {
    container: String,
    /// Whether `create_container` has succeeded.
    created: AtomicBool,
    /// Blobs indexed by name.
    blobs: DashMap<Arc<str>, StoredBlob>,
}

impl MemoryBlobStore {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            created: AtomicBool::new(false),
            blobs: DashMap::new(),
        }
    }

    fn check_container(&self) -> StoreResult<()> {
        if self.created.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn request_id() -> Option<String> {
        Some(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn container(&self) -> &str {
        &self.container
    }

    async fn create_container(&self) -> StoreResult<()> {
        if self.created.swap(true, Ordering::AcqRel) {
            return Err(StoreError::AlreadyExists);
        }
        Ok(())
    }

    async fn upload(
        &self,
        name: &str,
        data: Bytes,
        options: UploadOptions,
    ) -> StoreResult<UploadReceipt> {
        self.check_container()?;

        let properties = BlobProperties::new(options.content_type, data.len() as u64);
        let receipt = UploadReceipt {
            request_id: Self::request_id(),
            etag: properties.etag.clone(),
            last_modified: properties.last_modified,
            url: format!("memory://{}/{}", self.container, name),
        };

        self.blobs
            .insert(Arc::from(name), StoredBlob { data, properties });
        Ok(receipt)
    }

    async fn download(&self, name: &str) -> StoreResult<BlobDownload> {
        self.check_container()?;

        let blob = self
            .blobs
            .get(name)
            .map(|b| b.value().clone())
            .ok_or(StoreError::NotFound)?;

        let data = blob.data;
        let chunks: Vec<StoreResult<Bytes>> = (0..data.len())
            .step_by(CHUNK_SIZE)
            .map(|start| Ok(data.slice(start..(start + CHUNK_SIZE).min(data.len()))))
            .collect();

        Ok(BlobDownload {
            properties: blob.properties,
            body: stream::iter(chunks).boxed(),
        })
    }

    async fn list(&self) -> StoreResult<Vec<BlobItem>> {
        self.check_container()?;

        let mut items: Vec<BlobItem> = self
            .blobs
            .iter()
            .map(|entry| BlobItem {
                name: entry.key().to_string(),
                properties: entry.value().properties.clone(),
            })
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn delete(&self, name: &str) -> StoreResult<DeleteReceipt> {
        self.check_container()?;

        self.blobs
            .remove(name)
            .map(|_| DeleteReceipt {
                request_id: Self::request_id(),
            })
            .ok_or(StoreError::NotFound)
    }
}

/// Key type for entities - (partition key, row key).
type EntityKey = (Arc<str>, Arc<str>);

/// In-memory implementation of the table store.
pub struct MemoryTableStore {
    table: String,
    /// Whether `create_table` has succeeded.
    created: AtomicBool,
    /// Entities indexed by (partition key, row key).
    entities: DashMap<EntityKey, UserEntity>,
}

impl MemoryTableStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            created: AtomicBool::new(false),
            entities: DashMap::new(),
        }
    }

    #[inline]
    fn entity_key(partition_key: &str, row_key: &str) -> EntityKey {
        (Arc::from(partition_key), Arc::from(row_key))
    }

    fn check_table(&self) -> StoreResult<()> {
        if self.created.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    /// Returns a copy of the entity stamped with fresh store metadata.
    fn stamped(entity: &UserEntity) -> UserEntity {
        let mut stored = entity.clone();
        stored.timestamp = Some(Utc::now());
        stored.etag = Some(format!("W/{}", new_etag()));
        stored
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    fn table(&self) -> &str {
        &self.table
    }

    async fn create_table(&self) -> StoreResult<()> {
        if self.created.swap(true, Ordering::AcqRel) {
            return Err(StoreError::AlreadyExists);
        }
        Ok(())
    }

    async fn get_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<UserEntity> {
        self.check_table()?;

        let key = Self::entity_key(partition_key, row_key);
        self.entities
            .get(&key)
            .map(|e| e.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn query_partition(&self, partition_key: &str) -> StoreResult<Vec<UserEntity>> {
        self.check_table()?;

        let mut entities: Vec<UserEntity> = self
            .entities
            .iter()
            .filter(|entry| entry.key().0.as_ref() == partition_key)
            .map(|entry| entry.value().clone())
            .collect();
        entities.sort_by(|a, b| a.row_key.cmp(&b.row_key));
        Ok(entities)
    }

    async fn insert_entity(&self, entity: &UserEntity) -> StoreResult<UserEntity> {
        self.check_table()?;

        let key = Self::entity_key(&entity.partition_key, &entity.row_key);
        match self.entities.entry(key) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                let stored = Self::stamped(entity);
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn upsert_entity(&self, entity: &UserEntity) -> StoreResult<UserEntity> {
        self.check_table()?;

        let key = Self::entity_key(&entity.partition_key, &entity.row_key);
        let stored = Self::stamped(entity);
        self.entities.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<()> {
        self.check_table()?;

        let key = Self::entity_key(partition_key, row_key);
        self.entities
            .remove(&key)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
