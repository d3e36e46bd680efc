//! TUI implementation: the rendering context's event loop

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc;

use gloss_broker::{CoordinatorHandle, Relay, RelayReceiver, TabId};
use gloss_panel::{
    Action, Conversation, Theme, event_to_action,
    widgets::{InputBox, Spinner, Transcript},
};

use crate::injection::PanelNotice;

/// Rendering-context state: the conversation reducer plus view concerns.
struct PanelState {
    conversation: Conversation,
    input: InputBox,
    theme: Theme,
    scroll: usize,
    visible: bool,
    spinner_start: Instant,
}

impl PanelState {
    fn new() -> Self {
        let input = InputBox::new().with_placeholder("Ask about this page…");
        Self {
            conversation: Conversation::new(),
            input,
            theme: Theme::dark(),
            scroll: 0,
            visible: true,
            spinner_start: Instant::now(),
        }
    }

    /// Apply one relayed message, in arrival order.
    fn on_relay(&mut self, relay: Relay) {
        match relay {
            Relay::Event(event) => self.conversation.apply(&event),
            Relay::PageContext(page) => self.conversation.set_page_context(page),
        }
        // The input affordance is the only guard against double submission.
        // Scroll position is left alone so arriving tokens do not yank a
        // user who scrolled back in the transcript.
        self.input.set_disabled(self.conversation.is_loading);
    }

    fn render(&self, frame: &mut Frame) {
        if !self.visible {
            let hint = Paragraph::new(Line::from(Span::styled(
                "overlay hidden — Ctrl+O to show",
                self.theme.dim_style(),
            )));
            frame.render_widget(hint, frame.area());
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        frame.render_widget(
            Transcript::new(&self.conversation, &self.theme).with_scroll(self.scroll),
            chunks[0],
        );

        if self.conversation.is_loading {
            frame.render_widget(
                Spinner::new(&self.conversation.status, &self.theme, self.spinner_start),
                chunks[1],
            );
        } else {
            let status = Paragraph::new(Line::from(Span::styled(
                self.conversation.status.clone(),
                self.theme.dim_style(),
            )));
            frame.render_widget(status, chunks[1]);
        }

        let buf = frame.buffer_mut();
        self.input.render(chunks[2], buf, &self.theme);
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
}

/// Run the overlay panel until the user quits.
pub async fn run_tui(
    handle: CoordinatorHandle,
    tab: TabId,
    notice_tx: mpsc::UnboundedSender<PanelNotice>,
    mut panel_relay: RelayReceiver,
    question: Option<String>,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_loop(
        &mut terminal,
        handle,
        tab,
        notice_tx,
        &mut panel_relay,
        question,
    )
    .await;
    restore_terminal();
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    handle: CoordinatorHandle,
    tab: TabId,
    notice_tx: mpsc::UnboundedSender<PanelNotice>,
    panel_relay: &mut RelayReceiver,
    question: Option<String>,
) -> Result<()> {
    let mut state = PanelState::new();
    let mut events = EventStream::new();
    let tick = Duration::from_millis(100);

    // Mount: announce readiness, then kick off the initial request.
    let _ = notice_tx.send(PanelNotice::Ready);
    match question {
        Some(q) => {
            state.conversation.push_user_query(&q);
            let _ = notice_tx.send(PanelNotice::Ask(q));
        }
        None => {
            state.conversation.push_user_query("Summarize this page");
            let _ = notice_tx.send(PanelNotice::Summarize);
        }
    }
    state.input.set_disabled(true);

    loop {
        terminal.draw(|frame| state.render(frame))?;

        tokio::select! {
            event = events.next() => {
                let Some(Ok(event)) = event else { break };
                let Some(action) = event_to_action(event) else { continue };
                let width = terminal.size().map(|s| s.width).unwrap_or(80);
                if !handle_action(&mut state, action, &handle, tab, &notice_tx, width).await {
                    break;
                }
            }
            relay = panel_relay.recv() => {
                let Some(relay) = relay else { break };
                state.on_relay(relay);
            }
            _ = tokio::time::sleep(tick) => {}
        }
    }

    let _ = notice_tx.send(PanelNotice::Closed);
    Ok(())
}

/// Handle one input action; returns false to quit.
async fn handle_action(
    state: &mut PanelState,
    action: Action,
    handle: &CoordinatorHandle,
    tab: TabId,
    notice_tx: &mpsc::UnboundedSender<PanelNotice>,
    width: u16,
) -> bool {
    match action {
        Action::Quit | Action::Interrupt => return false,
        Action::ToggleOverlay => {
            // Optimistic flip; the coordinator drives the authoritative
            // lifecycle in the injection context.
            state.visible = !state.visible;
            handle.toggle(tab).await;
        }
        Action::Escape => {
            if state.visible {
                state.visible = false;
                handle.toggle(tab).await;
            }
        }
        Action::Submit => {
            if let Some(query) = state.input.take_submission() {
                state.conversation.push_user_query(&query);
                state.input.set_disabled(true);
                state.scroll = 0;
                let _ = notice_tx.send(PanelNotice::Ask(query));
            }
        }
        Action::ScrollUp => state.scroll += 1,
        Action::ScrollDown => state.scroll = state.scroll.saturating_sub(1),
        Action::PageUp => state.scroll += 10,
        Action::PageDown => state.scroll = state.scroll.saturating_sub(10),
        other => {
            state.input.handle_action(&other, width);
        }
    }
    true
}
