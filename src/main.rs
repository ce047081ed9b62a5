//! storage-functions: HTTP blob and table CRUD endpoints backed by Azure Storage.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use storage_functions::{Args, Config, FunctionServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug {
        Level::DEBUG
    } else if args.silent {
        Level::ERROR
    } else {
        Level::INFO
    };

    // RUST_LOG overrides the level chosen by the flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from(args);
    let server = FunctionServer::new(config)?;

    println!(
        r#"
Storage functions are starting at {}

  GET|POST|DELETE     {}/api/blob?blobName=<name>
  GET|POST|PUT|DELETE {}/api/table?userId=<id>&department=<dept>

Press Ctrl+C to stop the server.
"#,
        server.bind_address(),
        server.base_url(),
        server.base_url()
    );

    server.run().await
}
