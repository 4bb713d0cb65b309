use anyhow::Result;
use axum::Router;
use clap::Parser;
use recommender_core::EngineConfig;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use recommender_server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Movie data file or directory
    #[arg(long, default_value = "./data/movies.csv")]
    data: String,
    /// Optional JSON engine config
    #[arg(long)]
    config: Option<String>,
    /// Vocabulary size cap (overrides the config file)
    #[arg(long)]
    max_features: Option<usize>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(m) = args.max_features { config.max_features = m; }
    let app: Router = build_app(args.data.clone(), config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
