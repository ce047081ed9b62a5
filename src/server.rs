//! HTTP server hosting the blob and table endpoints.

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ConfigError;
use crate::router::{create_router, AppState};
use crate::storage::{ConnectionString, Stores};

/// Function host serving `/blob` and `/table`.
pub struct FunctionServer {
    config: Arc<Config>,
    stores: Option<Stores>,
}

impl FunctionServer {
    /// Creates a server, resolving stores from the configuration.
    ///
    /// `--in-memory` wins over a connection string. With neither, the server
    /// still starts and answers every request with a configuration error.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let stores = resolve_stores(&config)?;
        Ok(Self::with_stores(config, stores))
    }

    /// Creates a server with explicit stores.
    pub fn with_stores(config: Config, stores: Option<Stores>) -> Self {
        Self {
            config: Arc::new(config),
            stores,
        }
    }

    /// Builds the router with middleware.
    pub fn router(&self) -> Router {
        let state = AppState {
            stores: self.stores.clone(),
        };

        create_router(state)
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
                    .expose_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
    }

    /// Binds the configured address and runs the server.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_address().parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Runs the server on an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = listener.local_addr()?;
        info!("Functions are listening at http://{}", addr);
        info!("  blob:  http://{}/api/blob", addr);
        info!("  table: http://{}/api/table", addr);
        if self.stores.is_none() {
            warn!("Storage connection string not configured; all requests will fail");
        }

        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        self.config.bind_address()
    }

    /// Returns the base URL of the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.bind_address())
    }
}

fn resolve_stores(config: &Config) -> Result<Option<Stores>, ConfigError> {
    if config.in_memory {
        info!("Using in-memory stores");
        return Ok(Some(Stores::memory()));
    }

    match config.connection_string() {
        Some(raw) => {
            let connection: ConnectionString = raw.parse()?;
            info!(
                "Using storage account {} (blob: {}, table: {})",
                connection.account_name, connection.blob_endpoint, connection.table_endpoint
            );
            Ok(Some(Stores::azure(&connection)))
        }
        None => Ok(None),
    }
}

/// Builder for creating a function server.
pub struct FunctionServerBuilder {
    config: Config,
    stores: Option<Stores>,
}

impl FunctionServerBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            stores: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the stores, overriding what the configuration would resolve.
    pub fn stores(mut self, stores: Stores) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Builds the server.
    pub fn build(self) -> Result<FunctionServer, ConfigError> {
        match self.stores {
            Some(stores) => Ok(FunctionServer::with_stores(self.config, Some(stores))),
            None => FunctionServer::new(self.config),
        }
    }
}

impl Default for FunctionServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
