//! Server configuration.

use clap::Parser;
use std::fmt;

/// Default host address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port, matching the local function host.
pub const DEFAULT_PORT: u16 = 7071;

/// Environment variable holding the storage connection string.
pub const CONNECTION_STRING_ENV: &str = "AZURE_STORAGE_CONNECTION_STRING";

/// Command-line arguments for the server.
#[derive(Parser, Debug, Clone)]
#[command(name = "storage-functions")]
#[command(about = "HTTP blob and table CRUD endpoints backed by Azure Storage")]
#[command(version)]
pub struct Args {
    /// Host address to bind to.
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on.
    #[arg(long, short = 'p', default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Storage account connection string.
    #[arg(long, env = CONNECTION_STRING_ENV, hide_env_values = true)]
    pub connection_string: Option<String>,

    /// Serve from in-memory stores instead of a storage account.
    #[arg(long)]
    pub in_memory: bool,

    /// Enable debug logging.
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Enable silent mode (errors only).
    #[arg(long, short = 's')]
    pub silent: bool,
}

/// Immutable server configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Storage account connection string.
    pub connection_string: Option<String>,
    /// In-memory mode (no storage account).
    pub in_memory: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connection_string: None,
            in_memory: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "[REDACTED]"),
            )
            .field("in_memory", &self.in_memory)
            .finish()
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            connection_string: args.connection_string.filter(|s| !s.trim().is_empty()),
            in_memory: args.in_memory,
        }
    }
}

impl Config {
    /// Returns the connection string if one was supplied.
    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns whether a storage backend can be resolved from this config.
    pub fn is_configured(&self) -> bool {
        self.in_memory || self.connection_string().is_some()
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
