//! Message router: the only transport between execution contexts
//!
//! Two channel kinds, per the inter-context protocol:
//!
//! - command/ack: request/response with a single acknowledgment per message,
//!   FIFO within one channel instance, no cross-channel ordering.
//! - relay: fire-and-forget, ordered delivery of stream events and page
//!   context. A failed relay send is logged and swallowed; it never errors
//!   back to the sender and never retries.

use crate::message::{Ack, Command, Relay};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Failures surfaced on the command channel only.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouterError {
    /// The destination context is gone.
    #[error("Command channel closed")]
    ChannelClosed,
    /// The destination dropped the responder without acknowledging.
    #[error("Acknowledgment dropped")]
    AckDropped,
}

type CommandEnvelope = (Command, oneshot::Sender<Ack>);

/// Create a command/ack channel pair.
pub fn command_channel(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (CommandSender { tx }, CommandReceiver { rx })
}

/// Sending half of a command/ack channel.
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<CommandEnvelope>,
}

impl CommandSender {
    /// Send a command and wait for its acknowledgment.
    pub async fn request(&self, command: Command) -> Result<Ack, RouterError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send((command, ack_tx))
            .await
            .map_err(|_| RouterError::ChannelClosed)?;
        ack_rx.await.map_err(|_| RouterError::AckDropped)
    }
}

/// Receiving half of a command/ack channel.
pub struct CommandReceiver {
    rx: mpsc::Receiver<CommandEnvelope>,
}

impl CommandReceiver {
    /// Receive the next command, in FIFO order. `None` when all senders are
    /// gone.
    pub async fn recv(&mut self) -> Option<(Command, Responder)> {
        let (command, ack_tx) = self.rx.recv().await?;
        Some((command, Responder { ack_tx }))
    }
}

/// One-shot acknowledgment for a received command.
pub struct Responder {
    ack_tx: oneshot::Sender<Ack>,
}

impl Responder {
    /// Deliver the acknowledgment. If the requester stopped waiting the ack
    /// is dropped with a log line; that is not the responder's problem.
    pub fn ack(self, ack: Ack) {
        if self.ack_tx.send(ack).is_err() {
            tracing::debug!("requester gone before acknowledgment");
        }
    }
}

/// Create a relay channel pair.
pub fn relay_channel() -> (RelaySender, RelayReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RelaySender { tx }, RelayReceiver { rx })
}

/// Fire-and-forget sender into another context. Cloneable; all clones feed
/// the same ordered queue.
#[derive(Clone)]
pub struct RelaySender {
    tx: mpsc::UnboundedSender<Relay>,
}

impl RelaySender {
    /// Send a relay message. Delivery failure (destination torn down) is
    /// logged and dropped, never propagated.
    pub fn send(&self, message: Relay) {
        if let Err(e) = self.tx.send(message) {
            tracing::debug!("relay destination gone, dropping message: {:?}", e.0);
        }
    }
}

/// Receiving half of a relay channel.
pub struct RelayReceiver {
    rx: mpsc::UnboundedReceiver<Relay>,
}

impl RelayReceiver {
    /// Receive the next relay message in emission order.
    pub async fn recv(&mut self) -> Option<Relay> {
        self.rx.recv().await
    }

    /// Non-blocking variant for event-loop polling.
    pub fn try_recv(&mut self) -> Option<Relay> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloss_stream::StreamEvent;

    #[tokio::test]
    async fn test_command_ack_round_trip() {
        let (tx, mut rx) = command_channel(8);

        let server = tokio::spawn(async move {
            while let Some((command, responder)) = rx.recv().await {
                match command {
                    Command::ToggleOverlay => responder.ack(Ack::Toggled { visible: true }),
                    Command::OverlayReady => responder.ack(Ack::Acknowledged),
                    Command::CloseOverlay => responder.ack(Ack::Closed),
                    Command::GetPageContent => {
                        responder.ack(Ack::PageContent(Default::default()))
                    }
                }
            }
        });

        let ack = tx.request(Command::ToggleOverlay).await.unwrap();
        assert_eq!(ack, Ack::Toggled { visible: true });
        let ack = tx.request(Command::OverlayReady).await.unwrap();
        assert_eq!(ack, Ack::Acknowledged);

        drop(tx);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_command_channel_closed() {
        let (tx, rx) = command_channel(1);
        drop(rx);
        let err = tx.request(Command::ToggleOverlay).await.unwrap_err();
        assert_eq!(err, RouterError::ChannelClosed);
    }

    #[tokio::test]
    async fn test_ack_dropped() {
        let (tx, mut rx) = command_channel(1);
        tokio::spawn(async move {
            let (_command, responder) = rx.recv().await.unwrap();
            drop(responder);
        });
        let err = tx.request(Command::CloseOverlay).await.unwrap_err();
        assert_eq!(err, RouterError::AckDropped);
    }

    #[tokio::test]
    async fn test_relay_preserves_order() {
        let (tx, mut rx) = relay_channel();
        for i in 0..5 {
            tx.send(Relay::Event(StreamEvent::token(i.to_string())));
        }
        for i in 0..5 {
            match rx.recv().await.unwrap() {
                Relay::Event(event) => {
                    assert_eq!(event.payload_str(), Some(i.to_string().as_str()))
                }
                other => panic!("unexpected relay: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_relay_send_after_teardown_is_swallowed() {
        let (tx, rx) = relay_channel();
        drop(rx);
        // Must not panic or error.
        tx.send(Relay::Event(StreamEvent::token("late")));
    }
}
