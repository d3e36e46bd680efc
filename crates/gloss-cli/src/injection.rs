//! The injection context, as a task
//!
//! Sits between the coordinator and the rendering panel: answers the
//! coordinator's commands, forwards relay traffic into the panel, owns the
//! overlay lifecycle, and turns panel notifications into coordinator
//! requests.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use gloss_broker::{
    Ack, Command, CommandReceiver, CoordinatorHandle, Error, Injector, OverlayLifecycle,
    OverlayPhase, Relay, RelayReceiver, RelaySender, RequestBody, Result, TabChannels, TabId,
    command_channel, relay_channel,
};
use gloss_stream::{ChatRequest, PageContent, SummarizeRequest};

/// Notifications from the rendering context. Fire-and-forget, like the
/// custom events they model.
#[derive(Debug)]
pub enum PanelNotice {
    /// The panel finished mounting.
    Ready,
    /// Request a fresh page summary.
    Summarize,
    /// The user asked a question (already appended optimistically).
    Ask(String),
    /// The panel went away for good.
    Closed,
}

/// Everything the injection task needs, handed over on first injection.
pub struct InjectionParts {
    pub tab: TabId,
    pub page: PageContent,
    pub panel_relay: RelaySender,
    pub notice_rx: mpsc::UnboundedReceiver<PanelNotice>,
    pub handle: CoordinatorHandle,
}

/// Injector for the single CLI tab. The injection context does not exist
/// until the coordinator asks for it; a second injection attempt fails.
pub struct CliInjector {
    parts: Mutex<Option<InjectionParts>>,
}

impl CliInjector {
    pub fn new() -> Self {
        Self {
            parts: Mutex::new(None),
        }
    }

    /// Stage the pieces the injection task will be built from.
    pub fn install(&self, parts: InjectionParts) {
        *self.parts.lock() = Some(parts);
    }
}

#[async_trait]
impl Injector for CliInjector {
    async fn inject(&self, tab: TabId) -> Result<TabChannels> {
        let parts = self
            .parts
            .lock()
            .take()
            .ok_or_else(|| Error::Injection(tab, "injection context already exists".into()))?;

        let (commands, command_rx) = command_channel(8);
        let (relay, relay_rx) = relay_channel();
        tokio::spawn(run_injection(parts, command_rx, relay_rx));
        tracing::debug!("injected content context for {tab}");

        Ok(TabChannels { commands, relay })
    }
}

async fn run_injection(
    mut parts: InjectionParts,
    mut commands: CommandReceiver,
    mut relay: RelayReceiver,
) {
    let mut overlay = OverlayLifecycle::new();
    overlay.injected();

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some((command, responder)) = command else { break };
                match command {
                    Command::ToggleOverlay => {
                        // The terminal has no animation frames; the
                        // transition completes within the same turn, but
                        // still passes through the FSM.
                        if overlay.begin_toggle().is_some() {
                            overlay.finish_transition();
                        }
                        responder.ack(Ack::Toggled {
                            visible: overlay.phase() == OverlayPhase::Visible,
                        });
                    }
                    Command::GetPageContent => {
                        responder.ack(Ack::PageContent(parts.page.clone()));
                    }
                    Command::OverlayReady => responder.ack(Ack::Acknowledged),
                    Command::CloseOverlay => {
                        responder.ack(Ack::Closed);
                        break;
                    }
                }
            }
            message = relay.recv() => {
                let Some(message) = message else { break };
                parts.panel_relay.send(message);
            }
            notice = parts.notice_rx.recv() => {
                let Some(notice) = notice else { break };
                match notice {
                    PanelNotice::Ready => {
                        parts.panel_relay.send(Relay::PageContext(parts.page.clone()));
                    }
                    PanelNotice::Summarize => {
                        let body = RequestBody::Summarize(SummarizeRequest {
                            page_url: parts.page.url.clone(),
                            page_text: parts.page.text.clone(),
                            page_title: parts.page.title.clone(),
                        });
                        parts.handle.request(parts.tab, body).await;
                    }
                    PanelNotice::Ask(query) => {
                        let body = RequestBody::Chat(ChatRequest::from_page(&parts.page, query));
                        parts.handle.request(parts.tab, body).await;
                    }
                    PanelNotice::Closed => {
                        // Exit goes through the coordinator: it answers by
                        // sending CloseOverlay, acknowledged below. If the
                        // coordinator is already gone, its command sender is
                        // too, and the recv above ends the loop instead.
                        parts.handle.tab_closed(parts.tab).await;
                    }
                }
            }
        }
    }
    tracing::debug!("injection context for {} ended", parts.tab);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloss_broker::Coordinator;
    use gloss_stream::BackendClient;
    use std::sync::Arc;

    fn installed_injector() -> (Arc<CliInjector>, mpsc::UnboundedSender<PanelNotice>) {
        let injector = Arc::new(CliInjector::new());
        let (_coordinator, handle) = Coordinator::new(
            BackendClient::new("http://localhost:8000"),
            Arc::clone(&injector) as Arc<dyn gloss_broker::Injector>,
        );
        let (panel_tx, _panel_rx) = relay_channel();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        injector.install(InjectionParts {
            tab: TabId(1),
            page: PageContent::new("https://e.com", "E", "text"),
            panel_relay: panel_tx,
            notice_rx,
            handle,
        });
        (injector, notice_tx)
    }

    #[tokio::test]
    async fn test_close_overlay_acknowledged_and_context_ends() {
        let (injector, _notice_tx) = installed_injector();
        let channels = injector.inject(TabId(1)).await.unwrap();

        let ack = channels.commands.request(Command::CloseOverlay).await.unwrap();
        assert_eq!(ack, Ack::Closed);

        // The injection task exited; further commands cannot be delivered.
        assert!(channels.commands.request(Command::ToggleOverlay).await.is_err());
    }

    #[tokio::test]
    async fn test_second_injection_rejected() {
        let (injector, _notice_tx) = installed_injector();
        injector.inject(TabId(1)).await.unwrap();
        assert!(injector.inject(TabId(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_toggle_and_page_content_commands() {
        let (injector, _notice_tx) = installed_injector();
        let channels = injector.inject(TabId(1)).await.unwrap();

        let ack = channels.commands.request(Command::ToggleOverlay).await.unwrap();
        assert_eq!(ack, Ack::Toggled { visible: true });

        match channels.commands.request(Command::GetPageContent).await.unwrap() {
            Ack::PageContent(page) => assert_eq!(page.title, "E"),
            other => panic!("unexpected ack: {other:?}"),
        }
    }
}
