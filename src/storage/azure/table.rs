//! Table store backed by `azure_data_tables`.

use async_trait::async_trait;
use azure_data_tables::clients::TableServiceClientBuilder;
use azure_data_tables::prelude::*;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use super::connection::ConnectionString;
use super::{cloud_location, credentials, store_error};
use crate::error::StoreResult;
use crate::models::UserEntity;
use crate::storage::table::TableStore;

/// Entity as exchanged with the Table service.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntityWire {
    #[serde(rename = "PartitionKey")]
    partition_key: String,
    #[serde(rename = "RowKey")]
    row_key: String,
    #[serde(rename = "Timestamp", default, skip_serializing)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    age: i32,
}

impl From<&UserEntity> for EntityWire {
    fn from(user: &UserEntity) -> Self {
        Self {
            partition_key: user.partition_key.clone(),
            row_key: user.row_key.clone(),
            timestamp: None,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
        }
    }
}

impl EntityWire {
    fn into_user(self, etag: Option<String>) -> UserEntity {
        UserEntity {
            partition_key: self.partition_key,
            row_key: self.row_key,
            name: self.name,
            email: self.email,
            age: self.age,
            timestamp: self.timestamp,
            etag,
        }
    }
}

/// Quotes a key as an OData string literal.
fn key_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Filter selecting every entity of one partition.
fn partition_filter(partition_key: &str) -> String {
    format!("PartitionKey eq {}", key_literal(partition_key))
}

/// The record as written, without service-assigned fields.
fn stored(entity: &UserEntity) -> UserEntity {
    UserEntity {
        timestamp: None,
        etag: None,
        ..entity.clone()
    }
}

/// Table store bound to one table of a storage account.
pub struct AzureTableStore {
    client: TableClient,
    table: String,
}

impl AzureTableStore {
    pub fn new(connection: &ConnectionString, table: impl Into<String>) -> Self {
        let table = table.into();
        let client = TableServiceClientBuilder::with_location(
            cloud_location(connection, &connection.table_endpoint),
            credentials(connection),
        )
        .build()
        .table_client(table.clone());

        Self { client, table }
    }

    fn entity_client(&self, partition_key: &str, row_key: &str) -> EntityClient {
        self.client
            .partition_key_client(partition_key)
            .entity_client(row_key)
    }
}

#[async_trait]
impl TableStore for AzureTableStore {
    fn table(&self) -> &str {
        &self.table
    }

    async fn create_table(&self) -> StoreResult<()> {
        self.client.create().await.map_err(store_error)?;
        Ok(())
    }

    async fn get_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<UserEntity> {
        let response = self
            .entity_client(partition_key, row_key)
            .get::<EntityWire>()
            .await
            .map_err(store_error)?;
        Ok(response.entity.into_user(Some(response.etag.to_string())))
    }

    async fn query_partition(&self, partition_key: &str) -> StoreResult<Vec<UserEntity>> {
        let pages: Vec<_> = self
            .client
            .query()
            .filter(partition_filter(partition_key))
            .into_stream::<EntityWire>()
            .map_err(store_error)
            .try_collect()
            .await?;

        Ok(pages
            .into_iter()
            .flat_map(|page| page.entities)
            .map(|wire| wire.into_user(None))
            .collect())
    }

    async fn insert_entity(&self, entity: &UserEntity) -> StoreResult<UserEntity> {
        self.client
            .insert::<_, EntityWire>(EntityWire::from(entity))
            .map_err(store_error)?
            .await
            .map_err(store_error)?;

        Ok(stored(entity))
    }

    async fn upsert_entity(&self, entity: &UserEntity) -> StoreResult<UserEntity> {
        self.entity_client(&entity.partition_key, &entity.row_key)
            .insert_or_replace(EntityWire::from(entity))
            .map_err(store_error)?
            .await
            .map_err(store_error)?;

        Ok(stored(entity))
    }

    async fn delete_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<()> {
        self.entity_client(partition_key, row_key)
            .delete()
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
