//! Companion-device synchronization.
//!
//! Mutations made on one device are propagated to its paired counterpart
//! as instructions — operation plus typed payload — over a best-effort
//! relay. Instructions that cannot be handed to the transport yet are held
//! in a durable outbox and flushed once the session activates.
//!
//! ## Wire format
//!
//! Each instruction travels as a flat JSON mapping:
//!
//! ```text
//! { "operation": "addTemplateWorkout", "payload": { ...workout... } }
//! ```
//!
//! The relay's own control frames are defined in [`protocol`].

mod companion;
mod error;
mod instruction;
pub mod protocol;
mod transport;
mod ws;

pub use companion::{Companion, DeviceRole};
pub use error::SyncError;
pub use instruction::{Instruction, PendingInstruction};
pub use transport::{DetachedTransport, LoopbackTransport, Transport, TransportError};
pub use ws::{TransportEvent, WsTransport};
