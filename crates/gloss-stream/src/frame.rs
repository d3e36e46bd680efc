//! Chunk-invariant parser for the blank-line-delimited event-stream format
//!
//! The transport hands us arbitrarily split text fragments. `parse_frames`
//! takes the accumulated buffer (previous remainder + new bytes) and returns
//! every complete record plus the unconsumed tail. Because the output depends
//! only on the concatenated text, the event sequence is identical whether the
//! body arrives one byte at a time or all at once.

use crate::event::{EventKind, StreamEvent};
use serde_json::Value;

#[derive(Default)]
struct Record {
    event: Option<String>,
    data: Option<String>,
    id: Option<String>,
}

impl Record {
    /// A record needs at least an `event:` and a `data:` field; anything less
    /// is dropped silently.
    fn finish(self) -> Option<StreamEvent> {
        let (event, data) = match (self.event, self.data) {
            (Some(e), Some(d)) => (e, d),
            _ => return None,
        };
        let payload =
            serde_json::from_str(&data).unwrap_or_else(|_| Value::String(data.trim().to_string()));
        Some(StreamEvent {
            kind: EventKind::from_wire(&event),
            payload,
            id: self.id,
        })
    }
}

/// Parse every complete blank-line-terminated record out of `buffer`.
///
/// Returns the decoded events in order and the remainder: the trailing,
/// possibly incomplete record that has not seen its blank line yet. Callers
/// prepend the remainder to the next chunk of text and call again.
pub fn parse_frames(buffer: &str) -> (Vec<StreamEvent>, String) {
    let mut events = Vec::new();
    let mut record = Record::default();
    let mut consumed = 0;
    let mut offset = 0;

    for piece in buffer.split_inclusive('\n') {
        offset += piece.len();
        if !piece.ends_with('\n') {
            // Unterminated final line, part of the remainder.
            break;
        }
        let line = piece.trim_end_matches('\n').trim_end_matches('\r');
        if line.is_empty() {
            // Blank line terminates the record. Empty records (e.g. from
            // consecutive blank lines) produce nothing.
            if let Some(event) = std::mem::take(&mut record).finish() {
                events.push(event);
            }
            consumed = offset;
        } else if let Some(rest) = line.strip_prefix("event:") {
            record.event = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            record.data = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("id:") {
            record.id = Some(rest.trim().to_string());
        }
        // Unrecognized field prefixes are ignored for forward compatibility.
    }

    (events, buffer[consumed..].to_string())
}
