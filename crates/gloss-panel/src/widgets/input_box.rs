//! Single-line question input

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line text input. Disabled while a request is in flight, which is
/// the only guard against double submission.
#[derive(Debug, Default)]
pub struct InputBox {
    /// Current input text
    content: String,
    /// Cursor position (character index)
    cursor: usize,
    /// Horizontal scroll offset (display width)
    scroll: usize,
    placeholder: String,
    disabled: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Take the submitted text, clearing the box. Empty or disabled input
    /// yields nothing.
    pub fn take_submission(&mut self) -> Option<String> {
        if self.disabled || self.content.trim().is_empty() {
            return None;
        }
        self.cursor = 0;
        self.scroll = 0;
        Some(std::mem::take(&mut self.content).trim().to_string())
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn width_before_cursor(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    fn remove_char_at(&mut self, char_index: usize) {
        let start = self.byte_offset(char_index);
        let end = self.byte_offset(char_index + 1);
        self.content.drain(start..end);
    }

    fn insert_char(&mut self, c: char) {
        let offset = self.byte_offset(self.cursor);
        self.content.insert(offset, c);
        self.cursor += 1;
    }

    /// Handle an editing action; returns whether the box consumed it.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        if self.disabled {
            return false;
        }
        let char_count = self.content.chars().count();

        let consumed = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_char_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Delete => {
                if self.cursor < char_count {
                    self.remove_char_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    true
                } else {
                    false
                }
            }
            Action::Right => {
                if self.cursor < char_count {
                    self.cursor += 1;
                    true
                } else {
                    false
                }
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = char_count;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut target = self.cursor;
                while target > 0 && chars[target - 1] == ' ' {
                    target -= 1;
                }
                while target > 0 && chars[target - 1] != ' ' {
                    target -= 1;
                }
                let start = self.byte_offset(target);
                let end = self.byte_offset(self.cursor);
                self.content.drain(start..end);
                self.cursor = target;
                true
            }
            Action::Paste(text) => {
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        if !self.content.ends_with(' ') && self.cursor > 0 {
                            self.insert_char(' ');
                        }
                    } else {
                        self.insert_char(c);
                    }
                }
                true
            }
            _ => false,
        };

        if consumed {
            self.update_scroll(width as usize);
        }
        consumed
    }

    fn update_scroll(&mut self, width: usize) {
        let visible = width.saturating_sub(4);
        let cursor_pos = self.width_before_cursor();
        if cursor_pos < self.scroll {
            self.scroll = cursor_pos;
        } else if visible > 0 && cursor_pos >= self.scroll + visible {
            self.scroll = cursor_pos - visible + 1;
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let border = if self.disabled {
            theme.dim_style()
        } else {
            theme.accent_style()
        };
        let block = Block::default().borders(Borders::ALL).border_style(border);
        let inner = block.inner(area);
        block.render(area, buf);

        let (text, style) = if self.disabled {
            ("Waiting for response…".to_string(), theme.dim_style())
        } else if self.content.is_empty() {
            (self.placeholder.clone(), theme.dim_style())
        } else {
            (self.visible_window(inner.width as usize), theme.base_style())
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if !self.disabled && inner.width > 0 {
            let cursor_x = self.width_before_cursor().saturating_sub(self.scroll);
            if cursor_x < inner.width as usize {
                if let Some(cell) = buf.cell_mut((inner.x + cursor_x as u16, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }

    /// The horizontally scrolled slice of content that fits the width.
    fn visible_window(&self, width: usize) -> String {
        let mut skipped = 0;
        let mut out = String::new();
        let mut used = 0;
        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if skipped < self.scroll {
                skipped += w;
                continue;
            }
            if used + w > width {
                break;
            }
            out.push(c);
            used += w;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_action(&Action::Char(c), 80);
        }
        input
    }

    #[test]
    fn test_submission_trims_and_clears() {
        let mut input = typed("  hello  ");
        assert_eq!(input.take_submission(), Some("hello".to_string()));
        assert_eq!(input.content(), "");
        assert_eq!(input.take_submission(), None);
    }

    #[test]
    fn test_disabled_blocks_editing_and_submission() {
        let mut input = typed("pending question");
        input.set_disabled(true);
        assert!(!input.handle_action(&Action::Char('x'), 80));
        assert_eq!(input.take_submission(), None);
        // Re-enabled input submits normally.
        input.set_disabled(false);
        assert_eq!(input.take_submission(), Some("pending question".to_string()));
    }

    #[test]
    fn test_delete_word() {
        let mut input = typed("ask a question");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "ask a ");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("café");
        input.handle_action(&Action::Backspace, 80);
        assert_eq!(input.content(), "caf");
        input.handle_action(&Action::Home, 80);
        input.handle_action(&Action::Delete, 80);
        assert_eq!(input.content(), "af");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = typed("q");
        input.handle_action(&Action::Paste("a\r\nb".to_string()), 80);
        assert_eq!(input.content(), "qa b");
    }
}
