use clap::Parser;
use lodestore::api;
use lodestore::core::config::StoreOptions;
use lodestore::core::store::Store;
use lodestore::index::manager::IndexType;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(version, about = "Memory-mapped document store with hybrid search")]
struct Cli {
    /// Data file path
    #[arg(long, default_value = "data.json")]
    data: PathBuf,

    /// Listen address
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,

    /// Initial file size in bytes
    #[arg(long, default_value_t = 32 * 1024 * 1024)]
    size: u64,

    /// Advisory maximum file size in bytes
    #[arg(long, default_value_t = 512 * 1024 * 1024)]
    max_size: u64,

    /// Sync interval in seconds
    #[arg(long, default_value_t = 60)]
    sync_interval: u64,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "lodestore=debug,tower_http=debug"
    } else {
        "lodestore=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("lodestore v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("data file: {}", cli.data.display());

    let options = StoreOptions {
        initial_size: cli.size,
        max_size: cli.max_size,
        sync_interval: Duration::from_secs(cli.sync_interval),
        debug: cli.debug,
    };

    let store = Store::open(&cli.data, options)?;
    create_default_indexes(&store);

    api::serve(store.clone(), &cli.addr).await?;

    tracing::info!("closing store");
    store.close()?;

    Ok(())
}

fn create_default_indexes(store: &Store) {
    for field in ["title", "description", "tags"] {
        store.create_index(field, IndexType::Text);
    }
    store.create_index("embedding", IndexType::Vector);
}
