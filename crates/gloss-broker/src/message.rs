//! Typed message vocabulary crossing context boundaries
//!
//! Commands expect exactly one acknowledgment; relay messages are
//! fire-and-forget.

use gloss_stream::{PageContent, StreamEvent};
use serde::{Deserialize, Serialize};

/// Request half of the command/ack channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Flip overlay visibility in the injection context.
    ToggleOverlay,
    /// Ask the injection context for the extracted page content.
    GetPageContent,
    /// The rendering context finished mounting.
    OverlayReady,
    /// Close the overlay for good.
    CloseOverlay,
}

/// Acknowledgment for a `Command`. Each command maps to one ack variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ack {
    /// Overlay visibility after a toggle.
    Toggled { visible: bool },
    /// The extracted page content.
    PageContent(PageContent),
    /// Generic acknowledgment (ready notifications).
    Acknowledged,
    /// Overlay closed.
    Closed,
}

/// Fire-and-forget traffic into the injection and rendering contexts.
#[derive(Debug, Clone, PartialEq)]
pub enum Relay {
    /// One stream event for the conversation state machine.
    Event(StreamEvent),
    /// Page context captured at injection time.
    PageContext(PageContent),
}
