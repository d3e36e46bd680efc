//! gloss-broker: the coordinator context
//!
//! This crate owns everything the privileged context does: the per-tab
//! session table, the stream coordinator that drives backend requests and
//! relays events, the typed message router crossing context boundaries, and
//! the overlay lifecycle state machine.

pub mod coordinator;
pub mod error;
pub mod message;
pub mod overlay;
pub mod router;
pub mod session;

pub use coordinator::{
    Coordinator, CoordinatorHandle, CoordinatorMsg, Injector, RequestBody, TabChannels,
};
pub use error::{Error, Result};
pub use message::{Ack, Command, Relay};
pub use overlay::{OverlayLifecycle, OverlayPhase, Transition};
pub use router::{
    CommandReceiver, CommandSender, RelayReceiver, RelaySender, Responder, RouterError,
    command_channel, relay_channel,
};
pub use session::{SessionTable, TabId, TabSession};
