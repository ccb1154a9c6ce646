use anyhow::Result;
use colored::*;
use std::net::IpAddr;
use tandem_server::RelayConfig;
use tracing::error;

pub async fn run(
    host: IpAddr,
    port: u16,
    allowed_origin: String,
    max_participants: usize,
) -> Result<()> {
    let config = RelayConfig {
        host,
        port,
        allowed_origin,
        max_participants: (max_participants > 0).then_some(max_participants),
    };

    println!("{}", "🚀 Starting Tandem relay...".green().bold());
    println!("   📡 Listening: {}", config.listen_addr());
    println!("   🌐 Origin:    {}", config.allowed_origin);
    match config.max_participants {
        Some(max) => println!("   👥 Capacity:  {}", max),
        None => println!("   👥 Capacity:  unlimited"),
    }

    let result = tandem_server::serve(config).await;
    if let Err(e) = &result {
        error!("Relay stopped: {:?}", e);
    }
    result
}
