use clap::Parser;
use secrets_lib::{config::Settings, routes, store::FlatFileUserStore, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Secrets web service
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to a settings file; defaults to config/default.toml merged
    /// with SECRETS_-prefixed environment variables
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let storage = FlatFileUserStore::new(&config.data_dir)?;
    let state = Arc::new(AppState::new(storage, &config)?);
    let app = routes::create_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
