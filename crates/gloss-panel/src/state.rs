//! Conversation state machine
//!
//! Reduces the arriving event sequence into a transcript plus ephemeral UI
//! state. Events are applied one at a time, in arrival order, synchronously;
//! all accumulation happens in buffers owned by this state, never in
//! external cells.

use crate::message::{ChatMessage, Role};
use gloss_stream::{EventKind, PageContent, StreamEvent};

/// The section currently being summarized, from `chunk_start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub index: u64,
    pub heading: String,
}

/// Conversation transcript and ephemeral rendering state. Owned exclusively
/// by the rendering context and mutated only through `apply` and the user
/// submission path.
#[derive(Debug)]
pub struct Conversation {
    /// Append-only transcript.
    messages: Vec<ChatMessage>,
    /// Accumulation buffer for the open streaming span.
    pub streaming_buffer: String,
    pub is_loading: bool,
    pub status: String,
    pub error: Option<String>,
    pub page_context: Option<PageContent>,
    /// Whether the backend has indexed this page (summaries enable
    /// follow-ups).
    pub page_indexed: bool,
    /// Snapshot of the final summary text, taken at `final_end`.
    pub final_summary: Option<String>,
    /// An assistant response span is open and not yet finalized.
    response_pending: bool,
    current_section: Option<Section>,
    next_message_id: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            streaming_buffer: String::new(),
            is_loading: false,
            status: "Ready".to_string(),
            error: None,
            page_context: None,
            page_indexed: false,
            final_summary: None,
            response_pending: false,
            current_section: None,
            next_message_id: 1,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn response_pending(&self) -> bool {
        self.response_pending
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.current_section.as_ref()
    }

    /// Store the page this conversation is about.
    pub fn set_page_context(&mut self, page: PageContent) {
        self.page_context = Some(page);
    }

    /// Append the user's query optimistically, before any network response.
    pub fn push_user_query(&mut self, query: impl Into<String>) {
        let message = self.mint_message(Role::User, query);
        self.messages.push(message);
        self.is_loading = true;
        self.error = None;
        self.streaming_buffer.clear();
        self.status = "Sending".to_string();
    }

    /// Apply one stream event. The transition table is exhaustive over event
    /// kinds; unrecognized kinds are logged and ignored.
    pub fn apply(&mut self, event: &StreamEvent) {
        match &event.kind {
            EventKind::Connected => {
                self.is_loading = true;
                self.status = "Connected to server".to_string();
                self.error = None;
            }
            EventKind::Status => {
                if let Some(message) = event.message() {
                    self.status = message.to_string();
                }
            }
            EventKind::Progress => {
                if let Some(progress) = event.payload.get("progress").and_then(|v| v.as_f64()) {
                    self.status = format!("Processing ({:.0}%)", progress * 100.0);
                }
            }
            EventKind::ChunkStart | EventKind::SectionStart => {
                let index = event.payload.get("index").and_then(|v| v.as_u64()).unwrap_or(0);
                let heading = event
                    .payload
                    .get("heading")
                    .or_else(|| event.payload.get("title"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Section {}", index + 1));
                if !self.streaming_buffer.is_empty() {
                    self.streaming_buffer.push_str("\n\n");
                }
                self.streaming_buffer.push_str(&format!("### {heading}\n\n"));
                self.status = format!("Summarizing: {heading}");
                self.current_section = Some(Section { index, heading });
            }
            EventKind::ChunkEnd | EventKind::SectionEnd => {
                self.current_section = None;
            }
            EventKind::FinalStart => {
                self.streaming_buffer.clear();
                self.status = "Writing summary".to_string();
            }
            EventKind::FinalEnd => {
                self.final_summary = Some(self.streaming_buffer.clone());
            }
            EventKind::Token => {
                if let Some(token) = event.payload_str() {
                    self.streaming_buffer.push_str(token);
                }
            }
            EventKind::FollowupStart => {
                self.response_pending = true;
                self.streaming_buffer.clear();
                self.status = "Answering".to_string();
            }
            EventKind::SynthesisStart => {
                self.response_pending = true;
                self.streaming_buffer.clear();
                self.status = "Synthesizing".to_string();
            }
            EventKind::FollowupEnd | EventKind::SynthesisEnd => {
                self.materialize_response();
                self.response_pending = false;
            }
            EventKind::Complete => {
                // Safety net for a backend that never sent the matching end
                // event: an open, non-empty span still becomes one message.
                if self.response_pending {
                    self.materialize_response();
                }
                self.is_loading = false;
                self.status = "Complete".to_string();
                self.response_pending = false;
                self.streaming_buffer.clear();
                if self.page_context.is_some() {
                    self.page_indexed = true;
                }
            }
            EventKind::Error => {
                self.response_pending = false;
                self.is_loading = false;
                self.status = "Error".to_string();
                self.error = Some(
                    event
                        .message()
                        .unwrap_or("Something went wrong")
                        .to_string(),
                );
                self.streaming_buffer.clear();
            }
            EventKind::Ping => {}
            EventKind::Other(kind) => {
                tracing::debug!("ignoring unknown event kind: {kind}");
            }
        }
    }

    /// Close the open response span: a non-empty buffer becomes exactly one
    /// assistant message, then the buffer is cleared.
    fn materialize_response(&mut self) {
        if self.streaming_buffer.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.streaming_buffer);
        let message = self.mint_message(Role::Assistant, content);
        self.messages.push(message);
    }

    fn mint_message(&mut self, role: Role, content: impl Into<String>) -> ChatMessage {
        let id = format!("msg-{}", self.next_message_id);
        self.next_message_id += 1;
        ChatMessage::new(id, role, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(kind: EventKind, payload: serde_json::Value) -> StreamEvent {
        StreamEvent::new(kind, payload)
    }

    fn apply_all(state: &mut Conversation, events: &[StreamEvent]) {
        for e in events {
            state.apply(e);
        }
    }

    #[test]
    fn test_scenario_a_happy_path() {
        let mut state = Conversation::new();
        apply_all(
            &mut state,
            &[
                event(EventKind::Connected, json!({"status": "connected"})),
                event(EventKind::Status, json!({"message": "reading"})),
                event(EventKind::FollowupStart, json!({})),
                StreamEvent::token("Hello"),
                StreamEvent::token(" world"),
                event(EventKind::FollowupEnd, json!({})),
                event(EventKind::Complete, json!({})),
            ],
        );

        let last = state.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "Hello world");
        assert!(!state.is_loading);
        assert_eq!(state.status, "Complete");
        assert!(state.streaming_buffer.is_empty());
    }

    #[test]
    fn test_scenario_b_missing_end_safety_net() {
        let mut state = Conversation::new();
        apply_all(
            &mut state,
            &[
                event(EventKind::FollowupStart, json!({})),
                StreamEvent::token("partial answer"),
                event(EventKind::Complete, json!({})),
            ],
        );

        let assistant: Vec<_> = state
            .messages()
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .collect();
        assert_eq!(assistant.len(), 1);
        assert_eq!(assistant[0].content, "partial answer");
    }

    #[test]
    fn test_scenario_c_error_mid_stream() {
        let mut state = Conversation::new();
        apply_all(
            &mut state,
            &[
                event(EventKind::Connected, json!({})),
                event(EventKind::FollowupStart, json!({})),
                StreamEvent::token("Hel"),
                event(EventKind::Error, json!({"error": "connection reset"})),
            ],
        );

        assert!(state.messages().is_empty());
        assert_eq!(state.error.as_deref(), Some("connection reset"));
        assert!(!state.is_loading);
        assert_eq!(state.status, "Error");
    }

    #[test]
    fn test_token_concatenation_no_separators() {
        let mut state = Conversation::new();
        state.apply(&event(EventKind::SynthesisStart, json!({})));
        for token in ["a", "", "b c", "\n", "d"] {
            state.apply(&StreamEvent::token(token));
        }
        state.apply(&event(EventKind::SynthesisEnd, json!({})));

        assert_eq!(state.messages()[0].content, "ab c\nd");
    }

    #[test]
    fn test_at_most_one_materialization_per_span() {
        let mut state = Conversation::new();
        apply_all(
            &mut state,
            &[
                event(EventKind::FollowupStart, json!({})),
                StreamEvent::token("answer"),
                event(EventKind::FollowupEnd, json!({})),
                // The safety net must not duplicate the already-closed span.
                event(EventKind::Complete, json!({})),
            ],
        );
        assert_eq!(state.messages().len(), 1);

        // An empty span materializes nothing.
        apply_all(
            &mut state,
            &[
                event(EventKind::FollowupStart, json!({})),
                event(EventKind::FollowupEnd, json!({})),
                event(EventKind::Complete, json!({})),
            ],
        );
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn test_error_terminality_from_any_state() {
        for setup in [
            vec![],
            vec![event(EventKind::Connected, json!({}))],
            vec![
                event(EventKind::FollowupStart, json!({})),
                StreamEvent::token("x"),
            ],
            vec![event(EventKind::Complete, json!({}))],
        ] {
            let mut state = Conversation::new();
            apply_all(&mut state, &setup);
            state.apply(&event(EventKind::Error, json!({})));
            assert!(!state.is_loading);
            assert_eq!(state.error.as_deref(), Some("Something went wrong"));
            assert!(!state.response_pending());
        }
    }

    #[test]
    fn test_user_query_appended_optimistically() {
        let mut state = Conversation::new();
        state.streaming_buffer = "stale".to_string();
        state.push_user_query("What is this page about?");

        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].role, Role::User);
        assert!(state.is_loading);
        assert!(state.streaming_buffer.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_message_ids_unique_and_monotonic() {
        let mut state = Conversation::new();
        state.push_user_query("q1");
        apply_all(
            &mut state,
            &[
                event(EventKind::FollowupStart, json!({})),
                StreamEvent::token("a1"),
                event(EventKind::FollowupEnd, json!({})),
            ],
        );
        state.push_user_query("q2");

        let ids: Vec<_> = state.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["msg-1", "msg-2", "msg-3"]);
    }

    #[test]
    fn test_chunk_start_appends_heading_marker() {
        let mut state = Conversation::new();
        state.apply(&event(
            EventKind::ChunkStart,
            json!({"index": 0, "heading": "Getting Started"}),
        ));
        assert!(state.streaming_buffer.starts_with("### Getting Started\n\n"));
        assert_eq!(
            state.current_section(),
            Some(&Section {
                index: 0,
                heading: "Getting Started".to_string()
            })
        );

        state.apply(&event(EventKind::ChunkEnd, json!({})));
        assert!(state.current_section().is_none());
    }

    #[test]
    fn test_final_end_snapshots_without_appending() {
        let mut state = Conversation::new();
        apply_all(
            &mut state,
            &[
                event(EventKind::FinalStart, json!({})),
                StreamEvent::token("The summary."),
                event(EventKind::FinalEnd, json!({})),
            ],
        );
        assert_eq!(state.final_summary.as_deref(), Some("The summary."));
        assert!(state.messages().is_empty());
    }

    #[test]
    fn test_ping_and_unknown_kinds_ignored() {
        let mut state = Conversation::new();
        state.apply(&event(EventKind::FollowupStart, json!({})));
        state.apply(&StreamEvent::token("x"));
        let buffer_before = state.streaming_buffer.clone();

        state.apply(&event(EventKind::Ping, json!({"time": 1.0})));
        state.apply(&event(
            EventKind::Other("citations_start".to_string()),
            json!({}),
        ));

        assert_eq!(state.streaming_buffer, buffer_before);
        assert!(state.response_pending());
    }

    #[test]
    fn test_complete_marks_page_indexed() {
        let mut state = Conversation::new();
        state.set_page_context(PageContent::new("https://e.com", "E", "text"));
        assert!(!state.page_indexed);
        state.apply(&event(EventKind::Complete, json!({})));
        assert!(state.page_indexed);
    }
}
