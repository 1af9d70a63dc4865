//! Dengon relay server.
//!
//! Tracks presence over WebSocket and relays content events to conversation rooms.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin dengon-server
//! cargo run --bin dengon-server -- --host 0.0.0.0 --port 3000 --seed conversations.json
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use dengon_server::{
    app::build_server,
    config::{self, RelayConfig},
    infrastructure::repository::InMemoryConversationStore,
};
use dengon_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "dengon-server")]
#[command(about = "Realtime presence-and-broadcast relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = config::DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Upper bound of every conversation store call, in milliseconds
    #[arg(long, default_value_t = 5000)]
    store_timeout_ms: u64,

    /// JSON file with the initial conversation documents
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for RelayConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            store_timeout: Duration::from_millis(args.store_timeout_ms),
            seed: args.seed,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let relay_config = RelayConfig::from(args);

    let store = match &relay_config.seed {
        Some(path) => match config::load_seed(path).await {
            Ok(records) => {
                tracing::info!(
                    "Loaded {} conversations from {}",
                    records.len(),
                    path.display()
                );
                InMemoryConversationStore::with_records(records)
            }
            Err(e) => {
                tracing::error!("Failed to load seed '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => InMemoryConversationStore::new(),
    };

    let server = build_server(&relay_config, Arc::new(store), Arc::new(SystemClock));
    if let Err(e) = server.run(relay_config.host.clone(), relay_config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
