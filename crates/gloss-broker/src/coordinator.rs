//! Stream coordinator: turns logical requests into relayed event sequences
//!
//! Runs as a single task. Backend reads are spawned per request so a long
//! stream never blocks toggle handling, but the session table is only ever
//! touched from the coordinator's own loop turns.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use gloss_stream::{
    BackendClient, ChatRequest, Endpoint, FollowUpRequest, StreamEvent, SummarizeRequest,
};

use crate::{
    error::{Error, Result},
    message::{Ack, Command, Relay},
    router::{CommandSender, RelaySender},
    session::{SessionTable, TabId, TabSession},
};

/// Body of one logical request. Serializes as the bare endpoint body.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Summarize(SummarizeRequest),
    Followup(FollowUpRequest),
    Chat(ChatRequest),
}

impl RequestBody {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            RequestBody::Summarize(_) => Endpoint::Summarize,
            RequestBody::Followup(_) => Endpoint::Followup,
            RequestBody::Chat(_) => Endpoint::Chat,
        }
    }
}

/// Messages handled by the coordinator loop.
#[derive(Debug)]
pub enum CoordinatorMsg {
    /// Open or close the overlay for a tab.
    Toggle { tab: TabId },
    /// Issue a streaming backend request for a tab.
    Request { tab: TabId, body: RequestBody },
    /// The tab's injection context went away.
    TabClosed { tab: TabId },
}

/// Cloneable handle for sending messages into the coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<CoordinatorMsg>,
}

impl CoordinatorHandle {
    pub async fn toggle(&self, tab: TabId) {
        self.send(CoordinatorMsg::Toggle { tab }).await;
    }

    pub async fn request(&self, tab: TabId, body: RequestBody) {
        self.send(CoordinatorMsg::Request { tab, body }).await;
    }

    pub async fn tab_closed(&self, tab: TabId) {
        self.send(CoordinatorMsg::TabClosed { tab }).await;
    }

    async fn send(&self, msg: CoordinatorMsg) {
        if self.tx.send(msg).await.is_err() {
            tracing::warn!("coordinator gone, message dropped");
        }
    }
}

/// Creates the injection context for a tab and hands back its channels.
#[async_trait]
pub trait Injector: Send + Sync {
    async fn inject(&self, tab: TabId) -> Result<TabChannels>;
}

/// Channels into one tab's injection context.
pub struct TabChannels {
    pub commands: CommandSender,
    pub relay: RelaySender,
}

/// The coordinator context.
pub struct Coordinator {
    client: BackendClient,
    sessions: SessionTable,
    tabs: HashMap<TabId, TabChannels>,
    injector: Arc<dyn Injector>,
    rx: mpsc::Receiver<CoordinatorMsg>,
    /// How long to let a freshly injected context settle before the retried
    /// command.
    inject_settle: Duration,
}

impl Coordinator {
    pub fn new(client: BackendClient, injector: Arc<dyn Injector>) -> (Self, CoordinatorHandle) {
        let (tx, rx) = mpsc::channel(64);
        (
            Self {
                client,
                sessions: SessionTable::new(),
                tabs: HashMap::new(),
                injector,
                rx,
                inject_settle: Duration::from_millis(100),
            },
            CoordinatorHandle { tx },
        )
    }

    /// Override the post-injection settle delay (tests use zero).
    pub fn with_inject_settle(mut self, delay: Duration) -> Self {
        self.inject_settle = delay;
        self
    }

    /// Register an injection context that already exists (tab open at
    /// startup).
    pub fn register_tab(&mut self, tab: TabId, channels: TabChannels) {
        self.sessions.get_or_create(tab);
        self.tabs.insert(tab, channels);
    }

    pub fn session(&self, tab: TabId) -> Option<&TabSession> {
        self.sessions.get(tab)
    }

    /// Run the coordinator loop until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                CoordinatorMsg::Toggle { tab } => self.handle_toggle(tab).await,
                CoordinatorMsg::Request { tab, body } => self.handle_request(tab, body),
                CoordinatorMsg::TabClosed { tab } => self.handle_tab_closed(tab).await,
            }
        }
    }

    pub(crate) async fn handle_toggle(&mut self, tab: TabId) {
        self.sessions.get_or_create(tab);

        match self.send_toggle(tab).await {
            Ok(visible) => {
                self.sessions.get_or_create(tab).overlay_open = visible;
            }
            Err(first) => {
                // First use in this tab: inject the content context, give it
                // a moment, then retry the command exactly once.
                tracing::debug!("toggle for {tab} failed ({first}), injecting");
                match self.injector.inject(tab).await {
                    Ok(channels) => {
                        self.tabs.insert(tab, channels);
                    }
                    Err(e) => {
                        tracing::warn!("injection failed for {tab}: {e}");
                        return;
                    }
                }
                tokio::time::sleep(self.inject_settle).await;
                match self.send_toggle(tab).await {
                    Ok(visible) => {
                        self.sessions.get_or_create(tab).overlay_open = visible;
                    }
                    Err(e) => tracing::warn!("toggle for {tab} abandoned: {e}"),
                }
            }
        }
    }

    async fn send_toggle(&self, tab: TabId) -> Result<bool> {
        let channels = self
            .tabs
            .get(&tab)
            .ok_or_else(|| Error::Other(format!("no injection context for {tab}")))?;
        match channels.commands.request(Command::ToggleOverlay).await? {
            Ack::Toggled { visible } => Ok(visible),
            other => Err(Error::Other(format!("unexpected toggle ack: {other:?}"))),
        }
    }

    pub(crate) fn handle_request(&mut self, tab: TabId, body: RequestBody) {
        self.sessions.get_or_create(tab);
        let Some(channels) = self.tabs.get(&tab) else {
            tracing::warn!("request for {tab} dropped, no injection context");
            return;
        };

        let request_id = Uuid::new_v4();
        let relay = channels.relay.clone();
        let client = self.client.clone();
        tracing::debug!("request {request_id} for {tab}: {:?}", body.endpoint());

        // The read runs to completion or failure on its own; closing the tab
        // or hiding the panel does not cancel it, late events are simply
        // dropped by the relay.
        tokio::spawn(async move {
            pump_request(&client, body, &relay, request_id).await;
        });
    }

    pub(crate) async fn handle_tab_closed(&mut self, tab: TabId) {
        self.sessions.remove(tab);
        if let Some(channels) = self.tabs.remove(&tab) {
            // Shut the injection context down explicitly; a delivery failure
            // just means it is already gone.
            match channels.commands.request(Command::CloseOverlay).await {
                Ok(Ack::Closed) => {}
                Ok(other) => tracing::warn!("unexpected close ack for {tab}: {other:?}"),
                Err(e) => tracing::debug!("close for {tab} not delivered: {e}"),
            }
        }
        tracing::debug!("{tab} closed, session removed");
    }
}

/// Issue one backend request and relay its events.
///
/// Transport failures, non-success statuses, and empty bodies all normalize
/// into a single synthesized `error` event; downstream never sees a raw
/// transport error.
pub async fn pump_request(
    client: &BackendClient,
    body: RequestBody,
    relay: &RelaySender,
    request_id: Uuid,
) {
    let events = match client.stream(body.endpoint(), &body).await {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!("request {request_id} failed to open: {e}");
            relay.send(Relay::Event(StreamEvent::error(e.user_message())));
            return;
        }
    };
    pump(events, relay, request_id).await;
}

/// Relay each decoded event in order; stop after normalizing the first
/// failure. A body that ends without producing a single event counts as
/// absent and is surfaced the same way.
pub async fn pump<S>(events: S, relay: &RelaySender, request_id: Uuid)
where
    S: Stream<Item = gloss_stream::Result<StreamEvent>>,
{
    let mut events = std::pin::pin!(events);
    let mut delivered = 0usize;

    while let Some(item) = events.next().await {
        match item {
            Ok(event) => {
                relay.send(Relay::Event(event));
                delivered += 1;
            }
            Err(e) => {
                tracing::warn!("request {request_id} failed mid-read: {e}");
                relay.send(Relay::Event(StreamEvent::error(e.user_message())));
                return;
            }
        }
    }

    if delivered == 0 {
        tracing::warn!("request {request_id} produced no events");
        relay.send(Relay::Event(StreamEvent::error(
            gloss_stream::Error::EmptyBody.user_message(),
        )));
    } else {
        tracing::debug!("request {request_id} relayed {delivered} events");
    }
}
