//! Common test utilities.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use storage_functions::models::UserEntity;
use storage_functions::{
    Config, FunctionServer, MemoryBlobStore, MemoryTableStore, StoreError, StoreResult, Stores,
    TableStore, CONTAINER_NAME, TABLE_NAME,
};

/// Test server wrapper.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Starts a server backed by fresh in-memory stores.
    pub async fn start() -> Self {
        Self::start_with(Some(Stores::memory())).await
    }

    /// Starts a server with no storage configured.
    pub async fn start_unconfigured() -> Self {
        Self::start_with(None).await
    }

    /// Starts a server on a random port with the given stores.
    pub async fn start_with(stores: Option<Stores>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = Config {
            host: "127.0.0.1".to_string(),
            port,
            ..Config::default()
        };

        let server = FunctionServer::with_stores(config, stores);
        tokio::spawn(async move {
            server.serve(listener).await.unwrap();
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        }
    }

    /// Returns the URL for a path on the server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Table store that counts record operations before delegating.
///
/// `create_table` is not counted; it runs on every request.
pub struct CountingTableStore {
    inner: MemoryTableStore,
    calls: AtomicUsize,
}

impl CountingTableStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryTableStore::new(TABLE_NAME),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the number of record operations performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TableStore for CountingTableStore {
    fn table(&self) -> &str {
        self.inner.table()
    }

    async fn create_table(&self) -> StoreResult<()> {
        self.inner.create_table().await
    }

    async fn get_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<UserEntity> {
        self.record();
        self.inner.get_entity(partition_key, row_key).await
    }

    async fn query_partition(&self, partition_key: &str) -> StoreResult<Vec<UserEntity>> {
        self.record();
        self.inner.query_partition(partition_key).await
    }

    async fn insert_entity(&self, entity: &UserEntity) -> StoreResult<UserEntity> {
        self.record();
        self.inner.insert_entity(entity).await
    }

    async fn upsert_entity(&self, entity: &UserEntity) -> StoreResult<UserEntity> {
        self.record();
        self.inner.upsert_entity(entity).await
    }

    async fn delete_entity(&self, partition_key: &str, row_key: &str) -> StoreResult<()> {
        self.record();
        self.inner.delete_entity(partition_key, row_key).await
    }
}

/// Starts a server whose table store counts record operations.
pub async fn start_counting() -> (TestServer, Arc<CountingTableStore>) {
    let tables = Arc::new(CountingTableStore::new());
    let stores = Stores::new(
        Arc::new(MemoryBlobStore::new(CONTAINER_NAME)),
        tables.clone(),
    );
    (TestServer::start_with(Some(stores)).await, tables)
}

/// Table store whose every record operation is refused as malformed,
/// the way the service answers keys it cannot address.
pub struct RejectingTableStore;

impl RejectingTableStore {
    fn reject<T>() -> StoreResult<T> {
        Err(StoreError::BadInput(
            "OutOfRangeInput: One of the request inputs is out of range.".to_string(),
        ))
    }
}

#[async_trait]
impl TableStore for RejectingTableStore {
    fn table(&self) -> &str {
        TABLE_NAME
    }

    async fn create_table(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_entity(&self, _partition_key: &str, _row_key: &str) -> StoreResult<UserEntity> {
        Self::reject()
    }

    async fn query_partition(&self, _partition_key: &str) -> StoreResult<Vec<UserEntity>> {
        Self::reject()
    }

    async fn insert_entity(&self, _entity: &UserEntity) -> StoreResult<UserEntity> {
        Self::reject()
    }

    async fn upsert_entity(&self, _entity: &UserEntity) -> StoreResult<UserEntity> {
        Self::reject()
    }

    async fn delete_entity(&self, _partition_key: &str, _row_key: &str) -> StoreResult<()> {
        Self::reject()
    }
}

/// Starts a server whose table store refuses every record operation.
pub async fn start_rejecting() -> TestServer {
    let stores = Stores::new(
        Arc::new(MemoryBlobStore::new(CONTAINER_NAME)),
        Arc::new(RejectingTableStore),
    );
    TestServer::start_with(Some(stores)).await
}
