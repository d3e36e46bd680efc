//! Plain (non-TUI) mode: stream the summary straight to stdout.

use std::io::{self, Write};

use anyhow::Result;
use tokio::sync::mpsc;

use gloss_broker::{Relay, RelayReceiver};
use gloss_panel::Conversation;
use gloss_stream::EventKind;

use crate::injection::PanelNotice;

/// Run one summarize (or chat) request to completion, printing tokens as
/// they arrive, then exit.
pub async fn run_plain(
    notice_tx: mpsc::UnboundedSender<PanelNotice>,
    mut panel_relay: RelayReceiver,
    question: Option<String>,
) -> Result<()> {
    let mut conversation = Conversation::new();
    let mut stdout = io::stdout();

    let _ = notice_tx.send(PanelNotice::Ready);
    match question {
        Some(q) => {
            conversation.push_user_query(&q);
            let _ = notice_tx.send(PanelNotice::Ask(q));
        }
        None => {
            conversation.push_user_query("Summarize this page");
            let _ = notice_tx.send(PanelNotice::Summarize);
        }
    }

    let mut last_status = conversation.status.clone();
    while let Some(relay) = panel_relay.recv().await {
        let Relay::Event(event) = relay else { continue };
        if matches!(event.kind, EventKind::Token) {
            write!(stdout, "{}", event.payload_str().unwrap_or_default())?;
            stdout.flush()?;
        }
        conversation.apply(&event);
        if conversation.status != last_status {
            eprintln!("-- {}", conversation.status);
            last_status = conversation.status.clone();
        }
        if event.is_terminal() {
            break;
        }
    }
    writeln!(stdout)?;

    if let Some(error) = &conversation.error {
        eprintln!("error: {error}");
    }

    let _ = notice_tx.send(PanelNotice::Closed);
    if conversation.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}
