//! WebSocket transport speaking to the relay.
//!
//! The socket is split into background read/write tasks; the coordinator
//! talks to them exclusively through channels, so all shared state is
//! touched from the task consuming [`TransportEvent`]s.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use uuid::Uuid;

use super::companion::DeviceRole;
use super::protocol::{ClientFrame, ServerFrame};
use super::transport::{Transport, TransportError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level happenings the sync loop reacts to.
#[derive(Debug)]
pub enum TransportEvent {
    /// The relay accepted the connection; the session is activated.
    Activated,
    /// Peer reachability changed.
    Reachability(bool),
    /// An inbound instruction frame (message or flushed transfer).
    Message(String),
    /// An inbound request frame; answer via [`WsTransport::send_reply`].
    Request { id: Uuid, body: String },
    /// The connection ended.
    Closed,
}

#[derive(Debug, Default)]
struct LinkState {
    activated: bool,
    reachable: bool,
    closed: bool,
}

pub struct WsTransport {
    state: Arc<Mutex<LinkState>>,
    outgoing: mpsc::UnboundedSender<ClientFrame>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    pending_requests: Arc<Mutex<HashMap<Uuid, oneshot::Sender<String>>>>,
}

impl WsTransport {
    /// Connects to the relay and spawns the socket tasks. Activation
    /// arrives as [`TransportEvent::Activated`] once the relay welcomes us.
    pub async fn connect(
        relay_url: &str,
        pair_code: &str,
        role: DeviceRole,
    ) -> Result<Self, TransportError> {
        let url = format!(
            "{}/sync?pair={}&role={}",
            relay_url.trim_end_matches('/'),
            pair_code,
            role
        );

        let (socket, _) = connect_async(&url)
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))?;
        let (mut sink, mut stream) = socket.split();

        let state = Arc::new(Mutex::new(LinkState::default()));
        let pending_requests: Arc<Mutex<HashMap<Uuid, oneshot::Sender<String>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<ClientFrame>();
        let (events_tx, events) = mpsc::unbounded_channel();

        // Writer task: frames queued by the coordinator go out the socket.
        tokio::spawn(async move {
            while let Some(frame) = outgoing_rx.recv().await {
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!("Failed to encode relay frame: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::text(text)).await.is_err() {
                    break;
                }
            }
        });

        // Reader task: relay frames become events or resolve requests.
        let reader_state = state.clone();
        let reader_pending = pending_requests.clone();
        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                let text = match message {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => continue,
                };

                let frame: ServerFrame = match serde_json::from_str(text.as_str()) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!("Ignoring undecodable relay frame: {}", e);
                        continue;
                    }
                };

                match frame {
                    ServerFrame::Welcome { peer_connected } => {
                        {
                            let mut state = reader_state.lock().unwrap();
                            state.activated = true;
                            state.reachable = peer_connected;
                        }
                        let _ = events_tx.send(TransportEvent::Activated);
                        let _ = events_tx.send(TransportEvent::Reachability(peer_connected));
                    }
                    ServerFrame::PeerStatus { connected } => {
                        reader_state.lock().unwrap().reachable = connected;
                        let _ = events_tx.send(TransportEvent::Reachability(connected));
                    }
                    ServerFrame::Deliver { body } => {
                        let _ = events_tx.send(TransportEvent::Message(body));
                    }
                    ServerFrame::Request { id, body } => {
                        let _ = events_tx.send(TransportEvent::Request { id, body });
                    }
                    ServerFrame::Reply { id, body } => {
                        if let Some(tx) = reader_pending.lock().unwrap().remove(&id) {
                            let _ = tx.send(body);
                        }
                    }
                    ServerFrame::Rejected { reason } => {
                        tracing::error!("Relay rejected the connection: {}", reason);
                        break;
                    }
                }
            }

            {
                let mut state = reader_state.lock().unwrap();
                state.activated = false;
                state.reachable = false;
                state.closed = true;
            }
            let _ = events_tx.send(TransportEvent::Closed);
        });

        Ok(Self {
            state,
            outgoing,
            events,
            pending_requests,
        })
    }

    /// The next transport event; `None` once the connection has closed and
    /// the event queue drained.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Answers an inbound [`TransportEvent::Request`].
    pub fn send_reply(&self, id: Uuid, body: String) -> Result<(), TransportError> {
        self.outgoing
            .send(ClientFrame::Reply { id, body })
            .map_err(|_| TransportError::Closed)
    }

    fn queue(&self, frame: ClientFrame) -> Result<(), TransportError> {
        self.outgoing.send(frame).map_err(|_| TransportError::Closed)
    }
}

impl Transport for WsTransport {
    fn counterpart_installed(&self) -> bool {
        // Connecting requires a configured pairing, which implies a
        // counterpart exists.
        true
    }

    fn is_activated(&self) -> bool {
        self.state.lock().unwrap().activated
    }

    fn is_reachable(&self) -> bool {
        self.state.lock().unwrap().reachable
    }

    async fn send_message(&mut self, frame: &str) -> Result<(), TransportError> {
        let state = self.state.lock().unwrap();
        if !state.activated {
            return Err(TransportError::NotActivated);
        }
        if !state.reachable {
            return Err(TransportError::NotReachable);
        }
        drop(state);
        self.queue(ClientFrame::Message {
            body: frame.to_string(),
        })
    }

    async fn transfer(&mut self, frame: &str) -> Result<(), TransportError> {
        if self.state.lock().unwrap().closed {
            return Err(TransportError::Closed);
        }
        self.queue(ClientFrame::Transfer {
            body: frame.to_string(),
        })
    }

    async fn request(&mut self, frame: &str) -> Result<String, TransportError> {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.pending_requests.lock().unwrap().insert(id, tx);

        if let Err(e) = self.queue(ClientFrame::Request {
            id,
            body: frame.to_string(),
        }) {
            self.pending_requests.lock().unwrap().remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_) => {
                self.pending_requests.lock().unwrap().remove(&id);
                Err(TransportError::Timeout)
            }
        }
    }
}
