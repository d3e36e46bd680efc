//! Streaming HTTP client for the summarization backend

use crate::{
    error::{Error, Result},
    event::StreamEvent,
    frame::parse_frames,
    types::Endpoint,
};
use async_stream::stream;
use futures::StreamExt;
use serde::Serialize;
use std::pin::Pin;
use tokio_stream::Stream;

/// An ordered stream of decoded events for one logical request.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// HTTP client for the backend's streaming endpoints.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for a backend base URL (e.g. `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a streaming POST against one of the backend endpoints.
    ///
    /// A non-success status is reported as `Error::Status` up front; after
    /// that, each decoded event arrives in wire order and a mid-read failure
    /// surfaces as a single `Err` item ending the stream. No retry, no
    /// timeout: one failed attempt is terminal for the request.
    pub async fn stream<B>(&self, endpoint: Endpoint, body: &B) -> Result<EventStream>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint.path());
        tracing::debug!("POST {url}");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                code: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        Ok(Box::pin(decode(response.bytes_stream())))
    }
}

/// Decode a raw byte stream into events, threading the frame parser's
/// remainder across chunks.
///
/// Bytes are buffered until they form valid UTF-8, so a codepoint split
/// across network chunks cannot corrupt the text; combined with the parser's
/// own chunk invariance, the decoded sequence is independent of how the
/// transport slices the body. Outright invalid sequences are dropped, never
/// allowed to stall decoding: the records behind them must still arrive.
pub fn decode<S, C, E>(bytes: S) -> impl Stream<Item = Result<StreamEvent>>
where
    S: Stream<Item = std::result::Result<C, E>>,
    C: AsRef<[u8]>,
    E: std::fmt::Display,
{
    stream! {
        let mut pending: Vec<u8> = Vec::new();
        let mut buffer = String::new();

        let mut bytes = std::pin::pin!(bytes);
        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(Error::Transport(e.to_string()));
                    return;
                }
            };

            pending.extend_from_slice(chunk.as_ref());
            loop {
                match std::str::from_utf8(&pending) {
                    Ok(text) => {
                        buffer.push_str(text);
                        pending.clear();
                        break;
                    }
                    Err(e) => {
                        let valid = e.valid_up_to();
                        // Safe split: everything below valid checked above.
                        buffer.push_str(
                            std::str::from_utf8(&pending[..valid]).unwrap_or_default(),
                        );
                        match e.error_len() {
                            // Invalid sequence: drop it and keep decoding so
                            // the records behind it still come through.
                            Some(bad) => {
                                tracing::debug!("dropping {bad} invalid UTF-8 bytes");
                                pending.drain(..valid + bad);
                            }
                            // Incomplete trailing codepoint; the rest of it
                            // arrives with the next chunk.
                            None => {
                                pending.drain(..valid);
                                break;
                            }
                        }
                    }
                }
            }

            let (events, rest) = parse_frames(&buffer);
            buffer = rest;
            for event in events {
                yield Ok(event);
            }
        }

        if !buffer.is_empty() || !pending.is_empty() {
            tracing::debug!(
                "stream ended mid-record, dropping {} unconsumed bytes",
                buffer.len() + pending.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    async fn collect(chunks: Vec<std::result::Result<Vec<u8>, String>>) -> Vec<Result<StreamEvent>> {
        decode(futures::stream::iter(chunks)).collect().await
    }

    fn ok(text: &str) -> std::result::Result<Vec<u8>, String> {
        Ok(text.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_decode_whole_body() {
        let items = collect(vec![ok(
            "event: token\ndata: \"Hi\"\n\nevent: complete\ndata: {}\n\n",
        )])
        .await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().kind, EventKind::Token);
        assert_eq!(items[1].as_ref().unwrap().kind, EventKind::Complete);
    }

    #[tokio::test]
    async fn test_decode_split_across_chunks() {
        let items = collect(vec![ok("event: tok"), ok("en\ndata: \"Hi\"\n\n")]).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap().payload_str(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_decode_split_inside_multibyte_char() {
        // "é" is 0xC3 0xA9; split between the two bytes.
        let body = "event: token\ndata: \"caf\u{e9}\"\n\n".as_bytes();
        let split = body.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let items = collect(vec![
            Ok(body[..split].to_vec()),
            Ok(body[split..].to_vec()),
        ])
        .await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap().payload_str(), Some("caf\u{e9}"));
    }

    #[tokio::test]
    async fn test_decode_transport_error_ends_stream() {
        let items = collect(vec![
            ok("event: token\ndata: \"a\"\n\n"),
            Err("connection reset".to_string()),
            ok("event: token\ndata: \"never seen\"\n\n"),
        ])
        .await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        match items[1].as_ref() {
            Err(Error::Transport(msg)) => assert_eq!(msg, "connection reset"),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decode_skips_invalid_utf8_between_records() {
        // A stray invalid byte must not stall the decoder: the terminal
        // record behind it still has to reach the consumer.
        let items = collect(vec![
            ok("event: token\ndata: \"a\"\n\n"),
            Ok(vec![0xFF]),
            ok("event: complete\ndata: {}\n\n"),
        ])
        .await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().kind, EventKind::Token);
        assert_eq!(items[1].as_ref().unwrap().kind, EventKind::Complete);
    }

    #[tokio::test]
    async fn test_decode_skips_invalid_utf8_inside_data() {
        let mut body = b"event: token\ndata: \"caf".to_vec();
        body.push(0xFF);
        body.extend_from_slice(b"e\"\n\nevent: complete\ndata: {}\n\n");
        let items = collect(vec![Ok(body)]).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().payload_str(), Some("cafe"));
        assert_eq!(items[1].as_ref().unwrap().kind, EventKind::Complete);
    }

    #[tokio::test]
    async fn test_decode_drops_trailing_partial_record() {
        let items = collect(vec![ok("event: token\ndata: \"a\"\n\nevent: tok")]).await;
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
