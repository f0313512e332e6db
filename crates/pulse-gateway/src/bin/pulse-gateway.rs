use clap::Parser;
use pulse_gateway::{
    GatewayBuilder,
    GatewayConfig,
    config::DEFAULT_RPC_URL,
};
use tracing_subscriber::{
    EnvFilter,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use url::Url;

#[derive(Debug, Parser)]
#[command(author, version, about = "Solana Pulse metrics gateway", long_about = None)]
struct Cli {
    /// Address for the gateway HTTP server (e.g. 0.0.0.0:9080)
    #[arg(long = "listen", default_value = "127.0.0.1:9080")]
    listen_addr: String,
    /// Upstream Solana JSON-RPC endpoint
    #[arg(long = "rpc-url", env = "SOLANA_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
    /// Hard deadline for each upstream call, in seconds
    #[arg(long = "request-timeout", default_value_t = 5)]
    request_timeout_secs: u64,
    /// TTL for cached upstream responses, in milliseconds
    #[arg(long = "cache-ttl-ms", default_value_t = 1_500)]
    rpc_cache_ttl_ms: u64,
    /// TTL for the aggregated snapshot, in milliseconds
    #[arg(long = "snapshot-ttl-ms", default_value_t = 1_500)]
    snapshot_ttl_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig {
        bind_addr: cli.listen_addr.parse()?,
        rpc_url: Url::parse(&cli.rpc_url)?,
        request_timeout_secs: cli.request_timeout_secs,
        rpc_cache_ttl_ms: cli.rpc_cache_ttl_ms,
        snapshot_ttl_ms: cli.snapshot_ttl_ms,
    };

    GatewayBuilder::new(config).build()?.serve().await?;
    Ok(())
}
