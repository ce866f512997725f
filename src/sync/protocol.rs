//! Frames exchanged between a device and the relay.
//!
//! The relay delivers immediate messages while the peer is connected,
//! holds store-and-forward transfers in a mailbox until it reconnects,
//! and signals peer reachability. Frames are JSON text messages; the
//! pairing code and device role travel in the connect URL.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Device -> relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    /// Immediate, unacknowledged delivery. If the peer disconnected since
    /// the sender last heard, the relay diverts the frame to the mailbox.
    Message { body: String },
    /// Store-and-forward delivery; held until the peer connects.
    Transfer { body: String },
    /// A message expecting a correlated reply from the peer.
    Request { id: Uuid, body: String },
    /// The reply to a previously delivered request.
    Reply { id: Uuid, body: String },
}

/// Relay -> device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    /// Join accepted; the session is activated.
    Welcome { peer_connected: bool },
    /// The peer connected or disconnected.
    PeerStatus { connected: bool },
    /// An inbound message or a flushed transfer.
    Deliver { body: String },
    /// An inbound request; answer with [`ClientFrame::Reply`] and the same id.
    Request { id: Uuid, body: String },
    /// The peer's reply to an earlier request.
    Reply { id: Uuid, body: String },
    /// The relay refused the connection.
    Rejected { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_round_trip() {
        let frames = vec![
            ClientFrame::Message {
                body: "a".to_string(),
            },
            ClientFrame::Transfer {
                body: "b".to_string(),
            },
            ClientFrame::Request {
                id: Uuid::new_v4(),
                body: "c".to_string(),
            },
        ];
        for frame in frames {
            let json = serde_json::to_string(&frame).unwrap();
            let parsed: ClientFrame = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, frame);
        }
    }

    #[test]
    fn test_tag_names() {
        let json = serde_json::to_value(ServerFrame::Welcome {
            peer_connected: true,
        })
        .unwrap();
        assert_eq!(json["type"], "welcome");
        let json = serde_json::to_value(ServerFrame::PeerStatus { connected: false }).unwrap();
        assert_eq!(json["type"], "peerStatus");
    }
}
