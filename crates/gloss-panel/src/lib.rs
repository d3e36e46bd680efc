//! gloss-panel: the rendering context
//!
//! Holds the conversation state machine that reduces relayed stream events
//! into a transcript, plus the ratatui widgets that draw the overlay panel.

pub mod input;
pub mod message;
pub mod state;
pub mod theme;
pub mod widgets;

pub use input::{Action, event_to_action, key_to_action};
pub use message::{ChatMessage, Role};
pub use state::Conversation;
pub use theme::Theme;
