//! AIWolf agent
//!
//! Connects the random sample agent to an AIWolf game server and plays the
//! requested number of games.

mod agent;

use agent::RandomAgent;
use aiwolf_bridge::{Framing, RetryPolicy};
use aiwolf_proxy::{AdapterMode, AgentProxy, DEFAULT_PORT, ProxyConfig};
use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "aiwolf-agent", version, about = "AIWolf agent over TCP")]
struct Args {
    /// Game server host
    #[arg(long, env = "AIWOLF_HOST", default_value = "localhost")]
    host: String,

    /// Game server port
    #[arg(short, long, env = "AIWOLF_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Name sent in reply to NAME
    #[arg(short, long, env = "AIWOLF_NAME", default_value = "aiwolf-rs")]
    name: String,

    /// Requested role, or `none`
    #[arg(short, long, env = "AIWOLF_ROLE", default_value = "none")]
    role: String,

    /// Games to play before disconnecting
    #[arg(short, long, env = "AIWOLF_GAMES", default_value_t = 5)]
    games: u32,

    /// Connect and read timeout in seconds
    #[arg(long, env = "AIWOLF_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// What the agent sees: raw or diffed
    #[arg(long, env = "AIWOLF_MODE", default_value = "diffed")]
    mode: AdapterMode,

    /// Frame assembler: brace or json
    #[arg(long, env = "AIWOLF_FRAMING", default_value = "brace")]
    framing: Framing,

    /// Consecutive empty reads tolerated before giving up
    #[arg(long, env = "AIWOLF_MAX_EMPTY_READS", default_value_t = 10)]
    max_empty_reads: u32,
}

impl Args {
    fn config(&self) -> ProxyConfig {
        ProxyConfig::with_server(self.host.clone(), self.port)
            .with_identity(self.name.clone(), self.role.clone())
            .with_total_games(self.games)
            .with_socket_timeout(Duration::from_secs(self.timeout))
            .with_mode(self.mode)
            .with_framing(self.framing)
            .with_retry(RetryPolicy {
                max_empty_reads: self.max_empty_reads,
                ..Default::default()
            })
    }
}

fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = args.config();
    config.validate()?;

    // One connection, one task
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let summary = runtime.block_on(async {
        let mut proxy = AgentProxy::new(config, RandomAgent::new());
        proxy.connect_server().await
    })
    .inspect_err(|e| {
        if e.is_transport() {
            error!("Lost the game server connection: {}", e);
        }
    })?;

    info!(
        "Played {} game(s), {} finished",
        summary.games_started, summary.games_finished
    );
    Ok(())
}
