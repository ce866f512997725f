use thiserror::Error;

use crate::store::StoreError;

use super::companion::DeviceRole;
use super::transport::TransportError;

/// Errors surfaced by the sync coordinator. Malformed or out-of-role
/// inbound frames are typed results; the receive loop logs them.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to decode instruction: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("instruction '{operation}' is not valid for the {role} role")]
    UnexpectedInstruction {
        operation: &'static str,
        role: DeviceRole,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
