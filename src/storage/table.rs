//! Table store abstraction.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::UserEntity;

/// Operations on a single fixed table of user records.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Returns the name of the bound table.
    fn table(&self) -> &str;

    /// Creates the bound table. Fails with `AlreadyExists` if present.
    async fn create_table(&self) -> StoreResult<()>;

    /// Fetches the record at (partition_key, row_key).
    async fn get_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<UserEntity>;

    /// Returns every record in the partition, following continuation.
    async fn query_partition(&self, partition_key: &str) -> StoreResult<Vec<UserEntity>>;

    /// Inserts a new record. Fails with `AlreadyExists` on key collision.
    async fn insert_entity(&self, entity: &UserEntity) -> StoreResult<UserEntity>;

    /// Inserts or wholly replaces the record at the entity's key.
    async fn upsert_entity(&self, entity: &UserEntity) -> StoreResult<UserEntity>;

    /// Deletes the record at (partition_key, row_key).
    async fn delete_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<()>;
}
