//! Transcript widget: the conversation plus the in-flight streaming tail

use crate::message::Role;
use crate::state::Conversation;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Renders the conversation transcript with role gutters, the streaming
/// buffer as a live tail, and the error line when set.
pub struct Transcript<'a> {
    conversation: &'a Conversation,
    theme: &'a Theme,
    /// Lines scrolled up from the bottom; 0 pins to the latest output.
    scroll_from_bottom: usize,
}

impl<'a> Transcript<'a> {
    pub fn new(conversation: &'a Conversation, theme: &'a Theme) -> Self {
        Self {
            conversation,
            theme,
            scroll_from_bottom: 0,
        }
    }

    pub fn with_scroll(mut self, scroll_from_bottom: usize) -> Self {
        self.scroll_from_bottom = scroll_from_bottom;
        self
    }

    fn gutter(&self, role: Role) -> Span<'static> {
        match role {
            Role::User => Span::styled("you ▌ ", self.theme.accent_bold()),
            Role::Assistant => Span::styled("    ▌ ", self.theme.assistant_style()),
        }
    }

    /// Build the full line list, wrapped to `width`.
    fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let wrap_width = width.saturating_sub(6).max(10);
        let mut lines = Vec::new();

        // The finished page summary stays pinned above the Q&A exchange.
        if let Some(summary) = &self.conversation.final_summary {
            for wrapped in wrap(summary, wrap_width) {
                lines.push(Line::from(Span::styled(wrapped, self.theme.base_style())));
            }
            lines.push(Line::default());
        }

        for message in self.conversation.messages() {
            let body_style = match message.role {
                Role::User => self.theme.base_style(),
                Role::Assistant => self.theme.base_style(),
            };
            for (i, wrapped) in wrap(&message.content, wrap_width).into_iter().enumerate() {
                let gutter = if i == 0 {
                    self.gutter(message.role)
                } else {
                    Span::styled("    ▌ ", self.theme.dim_style())
                };
                lines.push(Line::from(vec![
                    gutter,
                    Span::styled(wrapped, body_style),
                ]));
            }
            lines.push(Line::default());
        }

        // Streaming tail: the open span, rendered dim until materialized.
        if !self.conversation.streaming_buffer.is_empty() {
            for (i, wrapped) in wrap(&self.conversation.streaming_buffer, wrap_width)
                .into_iter()
                .enumerate()
            {
                let gutter = if i == 0 {
                    Span::styled("    ▌ ", self.theme.assistant_style())
                } else {
                    Span::styled("    ▌ ", self.theme.dim_style())
                };
                lines.push(Line::from(vec![
                    gutter,
                    Span::styled(wrapped, self.theme.dim_style()),
                ]));
            }
        }

        if let Some(error) = &self.conversation.error {
            lines.push(Line::from(Span::styled(
                format!("✗ {error}"),
                self.theme.error_style(),
            )));
        }

        lines
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, width)
                    .into_iter()
                    .map(|cow| cow.into_owned())
                    .collect()
            }
        })
        .collect()
}

impl Widget for Transcript<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(Span::styled(" gloss ", self.theme.accent_bold()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let lines = self.lines(inner.width as usize);
        let visible = inner.height as usize;

        // Pin to the bottom unless the user scrolled back.
        let bottom = lines.len().saturating_sub(self.scroll_from_bottom);
        let start = bottom.saturating_sub(visible);
        let window: Vec<Line> = lines[start..bottom].to_vec();

        Paragraph::new(window).render(inner, buf);
    }
}
