mod console;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use console::ConsoleStatus;
use std::sync::Arc;
use tandem::client::{
    ClientConfig, ConnectionSupervisor, RetryPolicy, RtcMediaFactory, WsConnector,
};
use tandem::relay::{RelayConfig, serve, serve_on};
use tandem::PeerId;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tandem", version, about = "Two-party audio calls over a signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay(RelayArgs),
    /// Join a room and place a call.
    Call(CallArgs),
    /// Local relay plus two peers calling each other.
    Demo {
        #[arg(long, default_value = "demo")]
        room: String,
    },
}

#[derive(Args)]
struct RelayArgs {
    #[arg(long, env = "TANDEM_LISTEN", default_value = "0.0.0.0:3000")]
    listen: String,

    #[arg(long, env = "TANDEM_PATH", default_value = "/tandem/ws")]
    path: String,

    #[arg(long, env = "TANDEM_TOKEN")]
    token: Option<String>,
}

#[derive(Args)]
struct CallArgs {
    #[arg(long, env = "TANDEM_RELAY_URL", default_value = "ws://127.0.0.1:3000")]
    url: String,

    #[arg(long, env = "TANDEM_PATH", default_value = "/tandem/ws")]
    path: String,

    /// Prompted for when omitted.
    #[arg(short, long, env = "TANDEM_ROOM")]
    room: Option<String>,

    #[arg(long, env = "TANDEM_PEER_ID")]
    peer_id: Option<String>,

    #[arg(long, env = "TANDEM_TOKEN", default_value = "")]
    token: String,

    #[arg(long, default_value_t = 3)]
    max_retry: u32,

    #[arg(long, default_value_t = 5000)]
    retry_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match Cli::parse().command {
        Commands::Relay(args) => run_relay(args).await,
        Commands::Call(args) => run_call(args).await,
        Commands::Demo { room } => run_demo(room).await,
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn run_relay(args: RelayArgs) -> Result<()> {
    let config = RelayConfig {
        listen: args.listen,
        path: args.path,
        token: args.token,
    };
    println!(
        "{} {}{}",
        "📡 Relay listening on".green().bold(),
        config.listen,
        config.path
    );

    serve(config, shutdown_signal())
        .await
        .context("Relay server failed")
}

async fn run_call(args: CallArgs) -> Result<()> {
    let room = match args.room {
        Some(room) => room,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Room")
            .default("DEFAULT".to_string())
            .interact_text()
            .context("Failed to read room name")?,
    };

    let mut config = ClientConfig::new(args.url, room)
        .with_auth_token(args.token)
        .with_retry(RetryPolicy {
            max_retry: args.max_retry,
            retry_delay_ms: args.retry_delay_ms,
        });
    config.path = args.path;
    if let Some(peer_id) = args.peer_id {
        config = config.with_peer_id(peer_id);
    }

    println!(
        "{} room {} as {}",
        "📞 Calling".green().bold(),
        config.room.bold(),
        config.peer_id
    );
    place_call(config, "call").await
}

async fn place_call(config: ClientConfig, label: &str) -> Result<()> {
    let factory = RtcMediaFactory::new(config.ice_servers.clone());
    let supervisor = ConnectionSupervisor::new(
        config,
        Arc::new(WsConnector),
        factory,
        Arc::new(ConsoleStatus::new(label)),
    );

    supervisor
        .run(shutdown_signal())
        .await
        .with_context(|| format!("Call `{}` ended with an error", label))
}

async fn run_demo(room: String) -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind local relay")?;
    let addr = listener.local_addr()?;
    let relay_config = RelayConfig::default();
    let path = relay_config.path.clone();
    tokio::spawn(serve_on(listener, relay_config, shutdown_signal()));

    println!(
        "{} ws://{}{} (room {})",
        "🚀 Demo relay on".green().bold(),
        addr,
        path,
        room.bold()
    );

    let peer = |name: &str| {
        let mut config = ClientConfig::new(format!("ws://{}", addr), room.clone())
            .with_peer_id(PeerId::from(name));
        config.path = path.clone();
        config
    };

    let (left, right) = tokio::join!(
        place_call(peer("left"), "left"),
        place_call(peer("right"), "right")
    );
    left.and(right)
}
