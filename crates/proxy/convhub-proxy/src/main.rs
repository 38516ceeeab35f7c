use clap::Parser;
use convhub_core::{load_env, utils::init_logging};
use convhub_proxy::{ProxyServer, ProxyServerConfig};

/// Stateless proxy for chat-completion providers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "CONVHUB_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env()?;
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut config = ProxyServerConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let mut server = ProxyServer::new(config);
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    server.stop().await?;
    Ok(())
}
