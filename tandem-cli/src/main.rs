use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::IpAddr;
use tandem_core::utils::{DEFAULT_ALLOWED_ORIGIN, DEFAULT_PORT};

mod call;
mod serve;
mod terminal;

#[derive(Parser)]
#[command(name = "tandem", version, about = "Two-party P2P calls over a signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        #[arg(long, env = "ALLOWED_ORIGIN", default_value = DEFAULT_ALLOWED_ORIGIN)]
        allowed_origin: String,

        /// 0 disables the cap.
        #[arg(long, env = "MAX_PARTICIPANTS", default_value_t = 2)]
        max_participants: usize,
    },

    /// Join a relay as a headless participant.
    Call {
        #[arg(long, default_value = "ws://127.0.0.1:3000/ws")]
        url: String,

        #[arg(long)]
        origin: Option<String>,

        /// Repeat to use several servers.
        #[arg(long)]
        stun: Vec<String>,

        /// Give up on a negotiation after this many seconds.
        #[arg(long)]
        negotiation_timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env не обязателен
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tandem=info,tower_http=info".into()),
        )
        .with_target(true)
        .init();

    match Cli::parse().command {
        Commands::Serve {
            host,
            port,
            allowed_origin,
            max_participants,
        } => serve::run(host, port, allowed_origin, max_participants).await,

        Commands::Call {
            url,
            origin,
            stun,
            negotiation_timeout,
        } => call::run(url, origin, stun, negotiation_timeout).await,
    }
}
