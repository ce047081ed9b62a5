//! storage-functions: HTTP blob and table CRUD endpoints backed by Azure Storage.
//!
//! The crate exposes two dispatchers, `/blob` and `/table`, each bound to a
//! single fixed container (`documents`) or table (`users`). Requests are
//! validated, forwarded to a [`BlobStore`] or [`TableStore`] and the outcome
//! is translated into an HTTP response.
//!
//! # Example
//!
//! ```no_run
//! use storage_functions::{Config, FunctionServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = FunctionServer::new(Config::default()).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod server;
pub mod storage;

// Re-exports for convenience
pub use config::{Args, Config, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{ApiError, ApiResult, ConfigError, ErrorCode, StoreError, StoreResult};
pub use server::{FunctionServer, FunctionServerBuilder};
pub use storage::{
    BlobStore, ConnectionString, MemoryBlobStore, MemoryTableStore, Stores, TableStore,
    CONTAINER_NAME, TABLE_NAME,
};
