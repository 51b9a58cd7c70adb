//! Chat server binary
//!
//! Launch modes:
//! - no arguments: development server on 127.0.0.1:8888
//! - one argument: bind that host at port 8888
//! - two arguments: bind host and port explicitly

use anyhow::Context;
use paperchat::{config::AppConfig, server::ChatServer};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paperchat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = AppConfig::load(Path::new("paperchat.toml"))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {}
        [host] => {
            config.server.host = host.clone();
        }
        [host, port] => {
            config.server.host = host.clone();
            config.server.port = port
                .parse()
                .with_context(|| format!("invalid port: {}", port))?;
        }
        _ => anyhow::bail!("usage: paperchat-server [host] [port]"),
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Chat model: {}", config.openai.chat_model);
    tracing::info!("  - Embedding model: {}", config.openai.embed_model);
    tracing::info!("  - Documents dir: {}", config.storage.documents_dir.display());
    tracing::info!("  - Index artifact: {}", config.storage.index_path.display());

    let server = ChatServer::new(config);

    println!("paperchat {}", env!("CARGO_PKG_VERSION"));
    println!("  API:    http://{}/api", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/upload - Upload PDF documents");
    println!("  POST /api/chat   - Ask questions");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
