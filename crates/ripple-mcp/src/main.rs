//! Ripple MCP server binary.
//!
//! This binary runs the MCP server using stdio transport. Logs go to
//! stderr so stdout stays clean for the protocol stream.

use ripple::{Config, GraphClient};
use ripple_mcp::RippleMcpServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting ripple-mcp server");

    let config = Config::from_env()?;
    let client = GraphClient::new(config)?;
    let server = RippleMcpServer::new(client);
    server.run().await?;

    Ok(())
}
