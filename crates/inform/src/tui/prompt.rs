//! The question box at the bottom of both screens.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{CursorMove, Input, Key, TextArea};

/// Height of the text area when it holds a single line (or nothing).
pub const MIN_ROWS: u16 = 1;
/// The text area stops growing here and scrolls instead.
pub const MAX_ROWS: u16 = 6;

/// Which screen the prompt sits on. Only the placeholder and layout differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    Hero,
    Chat,
}

impl PromptVariant {
    pub fn placeholder(&self) -> &'static str {
        match self {
            PromptVariant::Hero => "Ask anything about your training or nutrition...",
            PromptVariant::Chat => "Ask a follow-up question...",
        }
    }
}

/// What a key press did to the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    /// The text changed (or the cursor moved).
    Edited,
    /// Enter was pressed on non-blank text; carries the trimmed question.
    Submitted(String),
    /// Enter on blank text. Nothing happens.
    Ignored,
}

fn create_textarea<'a>(
    lines: impl Iterator<Item = &'a str>,
    variant: PromptVariant,
) -> TextArea<'static> {
    let mut textarea = TextArea::from(lines);
    // Disable underline on cursor line - it's distracting
    textarea.set_cursor_line_style(ratatui::style::Style::default());
    textarea.set_wrap_mode(tui_textarea::WrapMode::Word);
    textarea.set_placeholder_text(variant.placeholder());
    textarea.set_placeholder_style(
        ratatui::style::Style::default().fg(ratatui::style::Color::DarkGray),
    );
    textarea
}

pub struct PromptInput {
    textarea: TextArea<'static>,
    variant: PromptVariant,
}

impl PromptInput {
    pub fn new(variant: PromptVariant) -> Self {
        Self {
            textarea: create_textarea(std::iter::empty(), variant),
            variant,
        }
    }

    pub fn variant(&self) -> PromptVariant {
        self.variant
    }

    /// Move the prompt to another screen. Only the placeholder changes.
    pub fn set_variant(&mut self, variant: PromptVariant) {
        if self.variant != variant {
            self.variant = variant;
            self.textarea.set_placeholder_text(variant.placeholder());
        }
    }

    pub fn value(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.value().trim().is_empty()
    }

    /// Replace the text from outside, leaving the cursor at the end. This is
    /// how the landing screen's suggested questions drive the box.
    pub fn set_value(&mut self, value: &str) {
        let mut textarea = create_textarea(value.split('\n'), self.variant);
        textarea.move_cursor(CursorMove::Bottom);
        textarea.move_cursor(CursorMove::End);
        self.textarea = textarea;
    }

    pub fn clear(&mut self) {
        self.textarea = create_textarea(std::iter::empty(), self.variant);
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    /// Take the trimmed text and empty the box. Blank text is left untouched
    /// and yields `None`.
    pub fn submit(&mut self) -> Option<String> {
        let text = self.value().trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.clear();
        Some(text)
    }

    /// Rows the text area wants at `width` columns, clamped to
    /// `MIN_ROWS..=MAX_ROWS`. Shrinks back to `MIN_ROWS` once submitted.
    pub fn rows(&self, width: u16) -> u16 {
        let (lines, last_width) =
            word_wrap_line_count_with_last_width(&self.value(), usize::from(width));
        // The cursor sits after the last character; a full last line pushes
        // it onto a new one.
        let lines = if width > 0 && last_width >= usize::from(width) {
            lines.saturating_add(1)
        } else {
            lines
        };
        lines.clamp(MIN_ROWS, MAX_ROWS)
    }

    /// Insert pasted text at the cursor. Line breaks become newlines in the
    /// box; a paste never submits.
    pub fn paste(&mut self, text: &str) -> PromptAction {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if self.textarea.insert_str(text) {
            PromptAction::Edited
        } else {
            PromptAction::Ignored
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptAction {
        if key.code == KeyCode::Enter {
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT)
            {
                self.textarea.insert_newline();
                return PromptAction::Edited;
            }
            return match self.submit() {
                Some(text) => PromptAction::Submitted(text),
                None => PromptAction::Ignored,
            };
        }

        // Manually convert crossterm KeyEvent to tui-textarea Input
        // (needed due to crossterm version mismatch)
        let tui_key = match key.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            _ => Key::Null,
        };

        if tui_key != Key::Null {
            let input = Input {
                key: tui_key,
                ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
                alt: key.modifiers.contains(KeyModifiers::ALT),
                shift: key.modifiers.contains(KeyModifiers::SHIFT),
            };
            self.textarea.input(input);
        }
        PromptAction::Edited
    }
}

/// Count lines using word-wrap algorithm (matches TextArea's WrapMode::Word).
/// Words won't be broken mid-word, so this may produce more lines than character wrapping.
/// Returns (line_count, last_line_width).
fn word_wrap_line_count_with_last_width(text: &str, width: usize) -> (u16, usize) {
    if width == 0 || text.is_empty() {
        return (1, 0);
    }

    let mut line_count = 0u16;
    let mut current_line_width = 0usize;

    for line in text.split('\n') {
        current_line_width = 0;
        let mut line_started = false;

        for word in line.split_whitespace() {
            let word_width = unicode_width::UnicodeWidthStr::width(word);

            if !line_started {
                if word_width > width {
                    // Longer than the row: split by character
                    line_count = line_count.saturating_add(extra_rows(word_width, width));
                    current_line_width = word_width % width;
                    if current_line_width == 0 {
                        current_line_width = width;
                    }
                } else {
                    current_line_width = word_width;
                }
                line_started = true;
            } else {
                let needed = current_line_width + 1 + word_width;
                if needed > width {
                    line_count = line_count.saturating_add(1);
                    if word_width > width {
                        line_count = line_count.saturating_add(extra_rows(word_width, width));
                        current_line_width = word_width % width;
                        if current_line_width == 0 {
                            current_line_width = width;
                        }
                    } else {
                        current_line_width = word_width;
                    }
                } else {
                    current_line_width = needed;
                }
            }
        }

        // Every logical line occupies at least one row, even when empty
        line_count = line_count.saturating_add(1);
    }

    (line_count.max(1), current_line_width)
}

/// Rows beyond the first that a word wider than the row spills onto.
fn extra_rows(word_width: usize, width: usize) -> u16 {
    u16::try_from(word_width.div_ceil(width) - 1).unwrap_or(u16::MAX)
}
