use std::sync::Arc;

use clap::{Parser, Subcommand};
use serenity::all::Http;
use tracing::info;
use tracing_subscriber::EnvFilter;

use everlink_monitor::discord::{self, DiscordStatusSink};
use everlink_monitor::health;
use everlink_monitor::heartbeat::HeartbeatMonitor;
use everlink_monitor::Config;

#[derive(Parser)]
#[command(name = "everlink-monitor")]
#[command(about = "Discord liveness monitor for EverLink heartbeats", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the monitor (Discord bot + health endpoint)
    Run,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("everlink-monitor {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run) | None => run().await?,
    }

    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let ready = health::ready_flag();
    let http = Arc::new(Http::new(&config.token));
    let sink = Arc::new(DiscordStatusSink::new(http, config.status_channel_id));
    let monitor = Arc::new(HeartbeatMonitor::new(sink));

    let health_task = tokio::spawn(health::serve(config.health_addr.clone(), ready.clone()));
    let bot = discord::run(config, monitor.clone(), ready);

    tokio::select! {
        result = bot => result?,
        result = health_task => result??,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    monitor.stop_ticker();
    Ok(())
}
