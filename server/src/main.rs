use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use rag_server::{ServerConfig, build_service, serve, shutdown_signal};

/// Retrieval-augmented answering over HTTP.
#[derive(Debug, Parser)]
#[command(name = "rag-server", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "RAG_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration.
    #[arg(long)]
    bind: Option<String>,

    /// Keep documents in process memory instead of Weaviate.
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if cli.in_memory {
        config.in_memory = true;
    }

    let service = Arc::new(build_service(&config)?);
    service.initialize().await?;

    let listener = TcpListener::bind(&config.bind).await?;
    serve(listener, service, shutdown_signal(tokio::signal::ctrl_c())).await
}
