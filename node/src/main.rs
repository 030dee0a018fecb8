//! Platter market node daemon.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use platter_node::session::load_or_generate_key;
use platter_node::state::AppState;
use platter_node::store::MarketStore;

#[derive(Parser)]
#[command(name = "platter-node", about = "Platter food-market backend node")]
struct Cli {
    /// HTTP port to listen on.
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Directory for the market snapshot and session key
    /// (default: the platform data dir, e.g. ~/.local/share/platter).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory and write nothing to disk.
    #[arg(long)]
    ephemeral: bool,

    /// Browser origin allowed to send credentialed requests.
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,

    /// Session cookie lifetime in hours.
    #[arg(long, default_value_t = 180)]
    session_ttl_hours: i64,

    /// Upper bound in seconds on a single purchase commit.
    #[arg(long, default_value_t = 5)]
    commit_timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("platter")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let data_dir = if cli.ephemeral {
        None
    } else {
        Some(cli.data_dir.unwrap_or_else(default_data_dir))
    };

    let store = match &data_dir {
        Some(dir) => MarketStore::open(dir)?,
        None => MarketStore::in_memory(),
    };
    let signing_key = load_or_generate_key(data_dir.as_deref())?;

    let state = Arc::new(AppState::new(
        store,
        signing_key,
        chrono::Duration::hours(cli.session_ttl_hours),
        Duration::from_secs(cli.commit_timeout_secs),
    ));

    platter_node::serve(state, cli.port, &cli.cors_origin).await
}
