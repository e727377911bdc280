//! The `capgate serve` command.

use clap::Args;
use capgate_core::{Config, Orchestrator};

use crate::server;

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Build the adapters and run the gateway until Ctrl-C.
pub async fn execute(mut config: Config, args: ServeArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, args);

    let orchestrator = Orchestrator::from_config(&config)?;
    server::run(&config.server, orchestrator).await
}

fn apply_overrides(config: &mut Config, args: ServeArgs) {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
}
