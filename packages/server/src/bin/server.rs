//! Chat relay server accepting TCP and WebSocket clients.
//!
//! Every message is broadcast to all other connected clients, whichever
//! transport they use.
//!
//! Run with:
//! ```not_rust
//! AUTH_URL=http://localhost:9000 cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --auth-url http://localhost:9000 --stream-addr 0.0.0.0:8080
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use hiroba_server::{
    config::{DEFAULT_FRAMED_ADDR, DEFAULT_STREAM_ADDR, ServerConfig},
    infrastructure::{identity::HttpIdentityService, registry::ConnectionRegistry},
    ui::Server,
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Chat relay for TCP and WebSocket clients", long_about = None)]
struct Args {
    /// Address for raw TCP clients
    #[arg(long, env = "STREAM_ADDR", default_value = DEFAULT_STREAM_ADDR)]
    stream_addr: String,

    /// Address for WebSocket clients and the HTTP API
    #[arg(long, env = "FRAMED_ADDR", default_value = DEFAULT_FRAMED_ADDR)]
    framed_addr: String,

    /// Base URL of the identity service
    #[arg(long, env = "AUTH_URL")]
    auth_url: String,

    /// Deadline for one broadcast write, in milliseconds
    #[arg(long, env = "WRITE_TIMEOUT_MS", default_value_t = 5000)]
    write_timeout_ms: u64,

    /// Status table refresh interval in seconds (0 disables it)
    #[arg(long, env = "STATUS_INTERVAL", default_value_t = 2)]
    status_interval: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        let mut config = ServerConfig::new(args.auth_url)
            .with_status_interval_secs(args.status_interval);
        config.stream_addr = args.stream_addr;
        config.framed_addr = args.framed_addr;
        config.write_timeout = Duration::from_millis(args.write_timeout_ms);
        config
    }
}

#[tokio::main]
async fn main() {
    // A missing .env is fine; flags and the real environment still apply.
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // Initialize dependencies in order:
    // 1. Config
    // 2. Registry
    // 3. IdentityService
    // 4. Server
    let config = ServerConfig::from(args);
    let registry = Arc::new(ConnectionRegistry::new());
    let identity = Arc::new(HttpIdentityService::new(config.auth_url.clone()));
    tracing::info!("Using identity service at {}", identity.base_url());

    let server = match Server::bind(&config, registry, identity).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
