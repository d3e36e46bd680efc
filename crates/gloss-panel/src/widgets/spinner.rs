//! Status line spinner

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, text::Span, widgets::Widget};
use std::time::{Duration, Instant};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Animated spinner shown next to the status text while loading.
pub struct Spinner<'a> {
    label: &'a str,
    theme: &'a Theme,
    start: Instant,
}

impl<'a> Spinner<'a> {
    pub fn new(label: &'a str, theme: &'a Theme, start: Instant) -> Self {
        Self {
            label,
            theme,
            start,
        }
    }

    fn frame(&self) -> &'static str {
        let index = (self.start.elapsed().as_millis() / FRAME_DURATION.as_millis()) as usize;
        FRAMES[index % FRAMES.len()]
    }
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 {
            return;
        }
        let text = format!("{} {}", self.frame(), self.label);
        let span = Span::styled(text, self.theme.accent_style());
        buf.set_span(area.x, area.y, &span, area.width);
    }
}
