//! Sync CLI commands: connect to the relay and drain the outbox.

use std::time::Duration;

use clap::{Args, Subcommand};
use rand::Rng;

use crate::config::Config;
use crate::store::DataStore;
use crate::sync::{Companion, TransportEvent, WsTransport};

/// How long `sync flush` keeps the link open after the last event.
const FLUSH_IDLE: Duration = Duration::from_secs(3);

#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration and outbox status
    Status,

    /// Connect, exchange queued instructions, and disconnect
    Flush,

    /// Stay connected, exchanging instructions until interrupted
    Listen,

    /// Generate a pairing code for two devices to share
    Pair,
}

impl SyncCommand {
    pub async fn run(
        &self,
        store: &mut DataStore,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None | Some(SyncSubcommand::Flush) => run_link(store, config, Some(FLUSH_IDLE)).await,
            Some(SyncSubcommand::Listen) => run_link(store, config, None).await,
            Some(SyncSubcommand::Status) => self.status(store, config),
            Some(SyncSubcommand::Pair) => self.pair(),
        }
    }

    fn status(&self, store: &DataStore, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        println!("Sync Configuration");
        println!("==================");
        println!();

        if !config.sync.is_configured() {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  device_role: primary   # companion on the other device");
            println!("  sync:");
            println!("    relay_url: \"ws://localhost:8093\"");
            println!("    pair_code: \"gym-xxxxxx\"");
            println!();
            println!("Or set GYMTRACK_RELAY_URL and GYMTRACK_PAIR_CODE.");
            return Ok(());
        }

        println!("Status: Configured");
        println!("Role: {}", config.role()?);
        if let Some(url) = &config.sync.relay_url {
            println!("Relay: {}", url);
        }
        println!();
        println!(
            "Outbox: {} pending instruction{}",
            store.pending_instructions.len(),
            if store.pending_instructions.len() == 1 { "" } else { "s" }
        );
        println!(
            "Initial sync done: {}",
            store.user_info.was_companion_installed
        );
        Ok(())
    }

    fn pair(&self) -> Result<(), Box<dyn std::error::Error>> {
        const ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";
        let mut rng = rand::rng();
        let code: String = (0..6)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        println!("Pairing code: gym-{}", code);
        println!();
        println!("Set `sync.pair_code: \"gym-{}\"` on both devices, with", code);
        println!("`device_role: primary` on one and `device_role: companion` on the other.");
        Ok(())
    }
}

/// Connects to the relay and processes transport events. With an idle
/// timeout the link closes once traffic stops (`sync flush`); without one
/// it stays up until interrupted (`sync listen`).
async fn run_link(
    store: &mut DataStore,
    config: &Config,
    idle: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = config.role()?;
    let (relay_url, pair_code) = match (&config.sync.relay_url, &config.sync.pair_code) {
        (Some(url), Some(code)) => (url.clone(), code.clone()),
        _ => return Err("Sync not configured. Run `gymtrack sync status` for setup.".into()),
    };

    println!("Connecting to {} as {}...", relay_url, role);
    let transport = WsTransport::connect(&relay_url, &pair_code, role).await?;
    let mut companion = Companion::new(transport, role);

    loop {
        let event = match idle {
            Some(idle) => {
                match tokio::time::timeout(idle, companion.transport.next_event()).await {
                    Ok(event) => event,
                    Err(_) => break, // link is quiet; flush is done
                }
            }
            None => companion.transport.next_event().await,
        };

        let Some(event) = event else { break };

        match event {
            TransportEvent::Activated => {
                tracing::info!("Session activated");
                companion.on_activated(store).await;
            }
            TransportEvent::Reachability(reachable) => {
                companion.on_reachability_changed(store, reachable).await;
            }
            TransportEvent::Message(body) => {
                if let Err(e) = companion.handle_frame(store, &body).await {
                    tracing::error!("Ignoring inbound instruction: {}", e);
                }
            }
            TransportEvent::Request { id, body } => match companion.reply_frame(store, &body).await {
                Ok(reply) => {
                    if let Err(e) = companion.transport.send_reply(id, reply) {
                        tracing::error!("Failed to send reply: {}", e);
                    }
                }
                Err(e) => tracing::error!("Failed to answer request: {}", e),
            },
            TransportEvent::Closed => {
                println!("Connection closed.");
                break;
            }
        }
    }

    // Let the writer task hand queued frames to the socket before we drop it.
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!(
        "Done. {} instruction{} still pending.",
        store.pending_instructions.len(),
        if store.pending_instructions.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
