use crate::terminal::{SilentMediaSource, TerminalSurface};
use anyhow::{Context, Result};
use colored::*;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use std::sync::Arc;
use std::time::Duration;
use tandem_client::{
    CallCollaborators, CallEngine, CallHandle, CallNotice, CallState, EngineConfig,
    SignalingClient, WebRtcConnectivityFactory,
};
use tandem_core::IceServerConfig;
use tokio::sync::broadcast;
use tracing::{info, warn};

const MENU: &[&str] = &[
    "Start call",
    "Toggle audio",
    "Toggle video",
    "Hang up",
    "Quit",
];

pub async fn run(
    url: String,
    origin: Option<String>,
    stun: Vec<String>,
    negotiation_timeout: Option<u64>,
) -> Result<()> {
    let connection = SignalingClient::connect(&url, origin.as_deref()).await?;
    let participant_id = connection.participant_id;
    info!("Joined relay {} as {}", url, participant_id);

    println!(
        "{} connected to {} as {}",
        "✔".green(),
        url,
        participant_id.to_string().bold()
    );

    let mut config = EngineConfig {
        negotiation_timeout: negotiation_timeout.map(Duration::from_secs),
        ..EngineConfig::default()
    };
    if !stun.is_empty() {
        config.ice_servers = stun.into_iter().map(IceServerConfig::stun).collect();
    }

    let collaborators = CallCollaborators {
        media_source: Arc::new(SilentMediaSource { participant_id }),
        connectivity: Arc::new(WebRtcConnectivityFactory),
        local_surface: Arc::new(TerminalSurface { label: "local" }),
        remote_surface: Arc::new(TerminalSurface { label: "remote" }),
    };

    let handle = CallEngine::spawn(
        participant_id,
        config,
        collaborators,
        connection.outgoing,
        connection.incoming,
    );

    tokio::spawn(print_notices(handle.subscribe()));
    tokio::spawn(print_states(handle.clone()));

    loop {
        let choice = tokio::task::spawn_blocking(|| {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Call")
                .items(MENU)
                .default(0)
                .interact()
        })
        .await
        .context("Menu task failed")??;

        let result = match choice {
            0 => handle.start_call().await,
            1 => report_flag(&handle, "audio", handle.toggle_audio().await),
            2 => report_flag(&handle, "video", handle.toggle_video().await),
            3 => handle.hangup().await,
            _ => break,
        };

        if let Err(e) = result {
            warn!("Menu action failed: {}", e);
            println!("{} {}", "✖".red(), e);
        }
    }

    info!("Leaving the call");
    handle.hangup().await.ok();
    Ok(())
}

fn report_flag(
    handle: &CallHandle,
    kind: &str,
    result: Result<bool, tandem_client::CallError>,
) -> Result<(), tandem_client::CallError> {
    let enabled = result?;
    if handle.state() == CallState::Idle {
        println!("{} no local media yet", "·".dimmed());
    } else {
        println!("{} {} {}", "·".dimmed(), kind, if enabled { "on" } else { "off" });
    }
    Ok(())
}

async fn print_states(handle: CallHandle) {
    let mut rx = handle.state_changes();
    while rx.changed().await.is_ok() {
        let state = *rx.borrow_and_update();
        println!("{} {}", "◆".yellow(), state.to_string().bold());
    }
}

async fn print_notices(mut rx: broadcast::Receiver<CallNotice>) {
    loop {
        match rx.recv().await {
            Ok(notice) => {
                let line = match notice {
                    CallNotice::MediaAccessFailed(e) => format!("media unavailable: {}", e).red(),
                    CallNotice::CandidateRejected(e) => format!("candidate rejected: {}", e).yellow(),
                    CallNotice::RemoteMediaChanged { kind, enabled } => {
                        format!("peer turned {} {}", kind, if enabled { "on" } else { "off" }).cyan()
                    }
                    CallNotice::PeerLeft => "peer left the call".yellow(),
                    CallNotice::NegotiationFailed(e) => format!("negotiation failed: {}", e).red(),
                    CallNotice::NegotiationTimedOut => "negotiation timed out".red(),
                    CallNotice::ConnectivityChanged(state) => {
                        format!("connectivity {:?}", state).yellow()
                    }
                    CallNotice::RelayError(e) => format!("relay error: {}", e).red(),
                };
                println!("{} {}", "!".bold(), line);
            }
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
