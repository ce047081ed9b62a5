//! Storage backends for the blob and table endpoints.

pub mod azure;
mod blob;
mod memory;
mod table;

pub use azure::ConnectionString;
pub use blob::*;
pub use memory::*;
pub use table::*;

use std::sync::Arc;

/// Container every blob operation targets.
pub const CONTAINER_NAME: &str = "documents";

/// Table every user operation targets.
pub const TABLE_NAME: &str = "users";

/// The pair of stores shared by all requests.
#[derive(Clone)]
pub struct Stores {
    pub blobs: Arc<dyn BlobStore>,
    pub tables: Arc<dyn TableStore>,
}

impl Stores {
    /// Creates stores from explicit backends.
    pub fn new(blobs: Arc<dyn BlobStore>, tables: Arc<dyn TableStore>) -> Self {
        Self { blobs, tables }
    }

    /// Creates empty in-memory stores.
    pub fn memory() -> Self {
        Self::new(
            Arc::new(MemoryBlobStore::new(CONTAINER_NAME)),
            Arc::new(MemoryTableStore::new(TABLE_NAME)),
        )
    }

    /// Creates SDK clients for the account named by a connection string.
    pub fn azure(connection: &ConnectionString) -> Self {
        Self::new(
            Arc::new(azure::AzureBlobStore::new(connection, CONTAINER_NAME)),
            Arc::new(azure::AzureTableStore::new(connection, TABLE_NAME)),
        )
    }
}
