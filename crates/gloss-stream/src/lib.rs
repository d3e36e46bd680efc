//! gloss-stream: Event-stream wire protocol and streaming backend client
//!
//! This crate owns the blank-line-delimited event-stream format spoken by the
//! summarization backend: the event types, the chunk-invariant frame parser,
//! and the streaming HTTP client that turns a request into an ordered
//! sequence of events.

pub mod client;
pub mod error;
pub mod event;
pub mod frame;
pub mod types;

pub use client::{BackendClient, EventStream};
pub use error::{Error, Result};
pub use event::{EventKind, StreamEvent};
pub use types::{ChatRequest, Endpoint, FollowUpRequest, PageContent, SummarizeRequest};
