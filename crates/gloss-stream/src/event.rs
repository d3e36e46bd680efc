//! Stream event types produced by the frame parser

use serde_json::Value;

/// Event kinds emitted by the backend over the event stream.
///
/// `Other` carries an unrecognized kind verbatim so downstream consumers make
/// an explicit decision about it instead of falling through a default branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Connected,
    Status,
    Progress,
    ChunkStart,
    ChunkEnd,
    SectionStart,
    SectionEnd,
    SynthesisStart,
    SynthesisEnd,
    FinalStart,
    FinalEnd,
    Token,
    FollowupStart,
    FollowupEnd,
    Complete,
    Error,
    Ping,
    Other(String),
}

impl EventKind {
    /// Parse the wire name of an event kind.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "connected" => EventKind::Connected,
            "status" => EventKind::Status,
            "progress" => EventKind::Progress,
            "chunk_start" => EventKind::ChunkStart,
            "chunk_end" => EventKind::ChunkEnd,
            "section_start" => EventKind::SectionStart,
            "section_end" => EventKind::SectionEnd,
            "synthesis_start" => EventKind::SynthesisStart,
            "synthesis_end" => EventKind::SynthesisEnd,
            "final_start" => EventKind::FinalStart,
            "final_end" => EventKind::FinalEnd,
            "token" => EventKind::Token,
            "followup_start" => EventKind::FollowupStart,
            "followup_end" => EventKind::FollowupEnd,
            "complete" => EventKind::Complete,
            "error" => EventKind::Error,
            "ping" => EventKind::Ping,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// The wire name of this event kind.
    pub fn as_wire(&self) -> &str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Status => "status",
            EventKind::Progress => "progress",
            EventKind::ChunkStart => "chunk_start",
            EventKind::ChunkEnd => "chunk_end",
            EventKind::SectionStart => "section_start",
            EventKind::SectionEnd => "section_end",
            EventKind::SynthesisStart => "synthesis_start",
            EventKind::SynthesisEnd => "synthesis_end",
            EventKind::FinalStart => "final_start",
            EventKind::FinalEnd => "final_end",
            EventKind::Token => "token",
            EventKind::FollowupStart => "followup_start",
            EventKind::FollowupEnd => "followup_end",
            EventKind::Complete => "complete",
            EventKind::Error => "error",
            EventKind::Ping => "ping",
            EventKind::Other(name) => name,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// One decoded record from the event stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    pub kind: EventKind,
    pub payload: Value,
    pub id: Option<String>,
}

impl StreamEvent {
    /// Create an event with a payload and no id.
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            id: None,
        }
    }

    /// A token event carrying a text fragment.
    pub fn token(text: impl Into<String>) -> Self {
        Self::new(EventKind::Token, Value::String(text.into()))
    }

    /// A synthesized error event, shaped like the backend's own
    /// (`{"error": "..."}`), so the reducer treats both identically.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            EventKind::Error,
            serde_json::json!({ "error": message.into() }),
        )
    }

    /// Whether this event ends the logical request.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Complete | EventKind::Error)
    }

    /// The payload as a plain string, if it is one.
    pub fn payload_str(&self) -> Option<&str> {
        self.payload.as_str()
    }

    /// The human-readable message inside the payload. The backend puts status
    /// text under `message` and error text under `error`; a bare string
    /// payload is used as-is.
    pub fn message(&self) -> Option<&str> {
        self.payload
            .get("message")
            .or_else(|| self.payload.get("error"))
            .and_then(Value::as_str)
            .or_else(|| self.payload.as_str())
    }
}
