//! The pairing relay.
//!
//! Two devices sharing a pair code connect here; the relay forwards
//! immediate messages while both are connected, parks store-and-forward
//! transfers in the recipient's mailbox until it connects, correlates
//! request/reply exchanges, and tells each side when the other comes and
//! goes. This is the delivery/reachability substrate the sync coordinator
//! builds on; the relay never looks inside instruction frames.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, Mutex};

use crate::sync::protocol::{ClientFrame, ServerFrame};

const ROLES: [&str; 2] = ["primary", "companion"];

#[derive(Default)]
pub struct RelayState {
    pairs: Mutex<HashMap<String, PairState>>,
}

#[derive(Default)]
struct PairState {
    /// Keyed by role name.
    slots: HashMap<String, PeerSlot>,
}

#[derive(Default)]
struct PeerSlot {
    /// Present while this peer is connected.
    sender: Option<mpsc::UnboundedSender<ServerFrame>>,
    /// Frames awaiting this peer, oldest first.
    mailbox: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinParams {
    pair: String,
    role: String,
}

pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sync", get(ws_handler))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<JoinParams>,
    State(state): State<Arc<RelayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, params, socket))
}

fn peer_of(role: &str) -> &'static str {
    if role == "primary" {
        "companion"
    } else {
        "primary"
    }
}

async fn handle_socket(state: Arc<RelayState>, params: JoinParams, socket: WebSocket) {
    let JoinParams { pair, role } = params;
    let (mut sink, mut stream) = socket.split();

    if !ROLES.contains(&role.as_str()) {
        let _ = send_frame(
            &mut sink,
            &ServerFrame::Rejected {
                reason: format!("unknown role '{}'", role),
            },
        )
        .await;
        return;
    }

    // Claim this role's slot; welcome + any parked frames go through the
    // same channel as later traffic so ordering holds.
    let (tx, mut rx) = mpsc::unbounded_channel();
    {
        let mut pairs = state.pairs.lock().await;
        let pair_state = pairs.entry(pair.clone()).or_default();
        let slot = pair_state.slots.entry(role.clone()).or_default();
        if slot.sender.is_some() {
            drop(pairs);
            let _ = send_frame(
                &mut sink,
                &ServerFrame::Rejected {
                    reason: format!("role '{}' is already connected", role),
                },
            )
            .await;
            return;
        }
        slot.sender = Some(tx.clone());
        let mailbox = std::mem::take(&mut slot.mailbox);

        let peer_connected = pair_state
            .slots
            .get(peer_of(&role))
            .map(|s| s.sender.is_some())
            .unwrap_or(false);
        let _ = tx.send(ServerFrame::Welcome { peer_connected });
        for body in mailbox {
            let _ = tx.send(ServerFrame::Deliver { body });
        }

        notify_peer(pair_state, &role, ServerFrame::PeerStatus { connected: true });
    }

    tracing::info!("{}/{} connected", pair, role);

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if send_frame(&mut sink, &frame).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let frame: ClientFrame = match serde_json::from_str(text.as_str()) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("{}/{} sent an undecodable frame: {}", pair, role, e);
                continue;
            }
        };

        let mut pairs = state.pairs.lock().await;
        let Some(pair_state) = pairs.get_mut(&pair) else {
            break;
        };

        match frame {
            // An immediate message whose peer vanished mid-flight is
            // diverted to the mailbox rather than lost.
            ClientFrame::Message { body } | ClientFrame::Transfer { body } => {
                let peer = pair_state
                    .slots
                    .entry(peer_of(&role).to_string())
                    .or_default();
                match &peer.sender {
                    Some(sender) => {
                        if sender.send(ServerFrame::Deliver { body: body.clone() }).is_err() {
                            peer.mailbox.push(body);
                        }
                    }
                    None => peer.mailbox.push(body),
                }
            }
            ClientFrame::Request { id, body } => {
                let peer = pair_state
                    .slots
                    .entry(peer_of(&role).to_string())
                    .or_default();
                match &peer.sender {
                    Some(sender) => {
                        let _ = sender.send(ServerFrame::Request { id, body });
                    }
                    None => {
                        // The requester's timeout handles this.
                        tracing::debug!("{}/{}: dropping request, peer not connected", pair, role);
                    }
                }
            }
            ClientFrame::Reply { id, body } => {
                if let Some(sender) = pair_state
                    .slots
                    .get(peer_of(&role))
                    .and_then(|s| s.sender.as_ref())
                {
                    let _ = sender.send(ServerFrame::Reply { id, body });
                }
            }
        }
    }

    // Free the slot and tell the peer we are gone.
    {
        let mut pairs = state.pairs.lock().await;
        if let Some(pair_state) = pairs.get_mut(&pair) {
            if let Some(slot) = pair_state.slots.get_mut(&role) {
                slot.sender = None;
            }
            notify_peer(pair_state, &role, ServerFrame::PeerStatus { connected: false });
        }
    }
    writer.abort();
    tracing::info!("{}/{} disconnected", pair, role);
}

fn notify_peer(pair_state: &PairState, role: &str, frame: ServerFrame) {
    if let Some(sender) = pair_state
        .slots
        .get(peer_of(role))
        .and_then(|s| s.sender.as_ref())
    {
        let _ = sender.send(frame);
    }
}

async fn send_frame(
    sink: &mut SplitSink<WebSocket, Message>,
    frame: &ServerFrame,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(frame) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Failed to encode relay frame: {}", e);
            return Ok(());
        }
    };
    sink.send(Message::Text(text.into())).await
}
