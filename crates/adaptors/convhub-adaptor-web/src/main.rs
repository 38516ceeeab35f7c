use clap::Parser;
use convhub_adaptor_web::{WebUiConfig, WebUiServer};
use convhub_core::{load_env, utils::init_logging};

/// Browser UI for converting content and chatting through the convhub proxy
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Interface to bind (overrides WEB_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides WEB_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Proxy API root (overrides CONVHUB_PROXY_URL)
    #[arg(long)]
    proxy_url: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "CONVHUB_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env()?;
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut config = WebUiConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(proxy_url) = cli.proxy_url {
        config.proxy_url = proxy_url;
    }

    let mut server = WebUiServer::new(config);
    let addr = server.start().await?;
    println!("Open http://{} in your browser", addr);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    server.stop().await?;
    Ok(())
}
