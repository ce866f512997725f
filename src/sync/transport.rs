//! The transport seam between the sync coordinator and whatever carries
//! frames to the paired device.
//!
//! The coordinator only ever asks three questions — is a counterpart
//! installed, is the session activated, is the counterpart reachable — and
//! uses three verbs: an immediate unacknowledged send, a durable
//! store-and-forward transfer, and a request that waits for a reply.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport session is not activated")]
    NotActivated,
    #[error("counterpart is not reachable")]
    NotReachable,
    #[error("connection closed")]
    Closed,
    #[error("request timed out")]
    Timeout,
    #[error("websocket error: {0}")]
    WebSocket(String),
}

#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Whether a counterpart app exists to sync with at all.
    fn counterpart_installed(&self) -> bool;

    /// Whether the session handshake has completed.
    fn is_activated(&self) -> bool;

    /// Whether the counterpart can receive an immediate message right now.
    fn is_reachable(&self) -> bool;

    /// Immediate, unacknowledged delivery. Fails fast when the counterpart
    /// cannot receive.
    async fn send_message(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Durable best-effort delivery that does not require the counterpart
    /// to be reachable; the transport stores and forwards.
    async fn transfer(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Sends a frame and waits for the counterpart's reply frame.
    async fn request(&mut self, frame: &str) -> Result<String, TransportError>;
}

/// The transport used by ordinary CLI invocations, which never connect.
///
/// When a pairing is configured the counterpart exists but the session
/// never activates, so every instruction lands in the durable queue for a
/// later `sync flush`. Without a pairing there is no counterpart and the
/// coordinator drops instructions silently.
#[derive(Debug, Default)]
pub struct DetachedTransport {
    paired: bool,
}

impl DetachedTransport {
    pub fn paired() -> Self {
        Self { paired: true }
    }

    pub fn unpaired() -> Self {
        Self { paired: false }
    }
}

impl Transport for DetachedTransport {
    fn counterpart_installed(&self) -> bool {
        self.paired
    }

    fn is_activated(&self) -> bool {
        false
    }

    fn is_reachable(&self) -> bool {
        false
    }

    async fn send_message(&mut self, _frame: &str) -> Result<(), TransportError> {
        Err(TransportError::NotActivated)
    }

    async fn transfer(&mut self, _frame: &str) -> Result<(), TransportError> {
        Err(TransportError::NotActivated)
    }

    async fn request(&mut self, _frame: &str) -> Result<String, TransportError> {
        Err(TransportError::NotActivated)
    }
}

/// In-memory transport with scriptable state, for exercising the
/// coordinator without a socket.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    pub installed: bool,
    pub activated: bool,
    pub reachable: bool,
    /// When set, the next `send_message` fails once.
    pub fail_next_send: bool,
    pub sent: Vec<String>,
    pub transferred: Vec<String>,
    pub canned_reply: Option<String>,
}

impl LoopbackTransport {
    pub fn online() -> Self {
        Self {
            installed: true,
            activated: true,
            reachable: true,
            ..Self::default()
        }
    }
}

impl Transport for LoopbackTransport {
    fn counterpart_installed(&self) -> bool {
        self.installed
    }

    fn is_activated(&self) -> bool {
        self.activated
    }

    fn is_reachable(&self) -> bool {
        self.reachable
    }

    async fn send_message(&mut self, frame: &str) -> Result<(), TransportError> {
        if self.fail_next_send {
            self.fail_next_send = false;
            return Err(TransportError::NotReachable);
        }
        if !self.reachable {
            return Err(TransportError::NotReachable);
        }
        self.sent.push(frame.to_string());
        Ok(())
    }

    async fn transfer(&mut self, frame: &str) -> Result<(), TransportError> {
        self.transferred.push(frame.to_string());
        Ok(())
    }

    async fn request(&mut self, frame: &str) -> Result<String, TransportError> {
        self.sent.push(frame.to_string());
        self.canned_reply.take().ok_or(TransportError::Timeout)
    }
}
