//! Screen geometry.
//!
//! [`ScreenLayout::compute`] is a pure function of the terminal area and the
//! state. Rendering and mouse hit-testing both call it, so a click always
//! lands on what was drawn, and the mode popup follows its trigger when the
//! terminal is resized.

use inform_client::{Mode, View};
use ratatui::layout::{Constraint, Layout, Position, Rect};

use super::state::{AppState, FAQ_QUESTIONS, HERO_SCRIPT};

/// Widest the landing column gets.
const LANDING_WIDTH: u16 = 84;
/// Widest the chat column gets.
const CHAT_WIDTH: u16 = 100;
/// Title, blank row, then the script.
const HERO_HEIGHT: u16 = 2 + HERO_SCRIPT.len() as u16;
/// Borders plus one row per question.
const FAQ_HEIGHT: u16 = 2 + FAQ_QUESTIONS.len() as u16;
/// Label row plus tagline row per option.
const POPUP_OPTION_HEIGHT: u16 = 2;
const POPUP_WIDTH: u16 = 44;
pub const SEND_LABEL: &str = "[ Send ]";

/// Where the prompt box and its controls sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLayout {
    /// Bordered box around everything below
    pub block: Rect,
    /// The text area itself
    pub text: Rect,
    pub mode_trigger: Rect,
    pub send: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupLayout {
    pub area: Rect,
    pub options: Vec<(Mode, Rect)>,
    /// True when there was no room below the trigger
    pub opens_upward: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLayout {
    pub hero: Option<Rect>,
    pub faq: Option<Rect>,
    pub faq_items: Vec<Rect>,
    pub transcript: Option<Rect>,
    pub prompt: PromptLayout,
    pub footer: Rect,
    pub mode_popup: Option<PopupLayout>,
}

/// What sits under a mouse position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    ModeOption(Mode),
    /// Inside the popup but between options
    ModePopup,
    ModeTrigger,
    Send,
    Prompt,
    FaqItem(usize),
    Transcript,
    Nothing,
}

impl ScreenLayout {
    pub fn compute(area: Rect, state: &AppState) -> Self {
        let max_width = match state.view() {
            View::Landing => LANDING_WIDTH,
            View::Chat => CHAT_WIDTH,
        };
        let column = centered_column(area, max_width);

        // Borders (2) + controls row (1) around the text
        let text_width = column.width.saturating_sub(2);
        let prompt_height = state.prompt.rows(text_width) + 3;

        let mut layout = match state.view() {
            View::Landing => {
                let [_, hero, _, faq, _, prompt, _, footer] = Layout::vertical([
                    Constraint::Fill(1),
                    Constraint::Length(HERO_HEIGHT),
                    Constraint::Length(1),
                    Constraint::Length(FAQ_HEIGHT),
                    Constraint::Length(1),
                    Constraint::Length(prompt_height),
                    Constraint::Fill(1),
                    Constraint::Length(1),
                ])
                .areas(column);

                let faq_items = (0..FAQ_QUESTIONS.len() as u16)
                    .map(|i| Rect {
                        x: faq.x + 1,
                        y: faq.y + 1 + i,
                        width: faq.width.saturating_sub(2),
                        height: 1,
                    })
                    .filter(|r| r.y < faq.bottom().saturating_sub(1))
                    .collect();

                ScreenLayout {
                    hero: Some(hero),
                    faq: Some(faq),
                    faq_items,
                    transcript: None,
                    prompt: prompt_layout(prompt),
                    footer,
                    mode_popup: None,
                }
            }
            View::Chat => {
                let [transcript, prompt, footer] = Layout::vertical([
                    Constraint::Fill(1),
                    Constraint::Length(prompt_height),
                    Constraint::Length(1),
                ])
                .areas(column);

                ScreenLayout {
                    hero: None,
                    faq: None,
                    faq_items: Vec::new(),
                    transcript: Some(transcript),
                    prompt: prompt_layout(prompt),
                    footer,
                    mode_popup: None,
                }
            }
        };

        if state.selector.is_open() {
            layout.mode_popup = Some(popup_layout(area, layout.prompt.mode_trigger));
        }

        layout
    }

    /// Find what is at (`column`, `row`). The popup is drawn on top, so it
    /// wins over whatever is beneath it.
    pub fn hit(&self, column: u16, row: u16) -> Hit {
        let pos = Position::new(column, row);

        if let Some(popup) = &self.mode_popup {
            if let Some((mode, _)) = popup.options.iter().find(|(_, r)| r.contains(pos)) {
                return Hit::ModeOption(*mode);
            }
            if popup.area.contains(pos) {
                return Hit::ModePopup;
            }
        }

        if self.prompt.mode_trigger.contains(pos) {
            return Hit::ModeTrigger;
        }
        if self.prompt.send.contains(pos) {
            return Hit::Send;
        }
        if self.prompt.block.contains(pos) {
            return Hit::Prompt;
        }
        if let Some(i) = self.faq_items.iter().position(|r| r.contains(pos)) {
            return Hit::FaqItem(i);
        }
        if self.transcript.is_some_and(|r| r.contains(pos)) {
            return Hit::Transcript;
        }

        Hit::Nothing
    }
}

fn centered_column(area: Rect, max_width: u16) -> Rect {
    let width = area.width.min(max_width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn prompt_layout(block: Rect) -> PromptLayout {
    let inner = Rect {
        x: block.x + 1,
        y: block.y + 1,
        width: block.width.saturating_sub(2),
        height: block.height.saturating_sub(2),
    };
    let [text, controls] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

    let send_width = (SEND_LABEL.len() as u16).min(controls.width);
    let send = Rect {
        x: controls.right().saturating_sub(send_width),
        width: send_width,
        ..controls
    };
    let mode_trigger = Rect {
        width: (Mode::ALL
            .iter()
            .map(|m| trigger_label(*m).chars().count() as u16)
            .max()
            .unwrap_or(0))
        .min(controls.width.saturating_sub(send_width)),
        ..controls
    };

    PromptLayout {
        block,
        text,
        mode_trigger,
        send,
    }
}

/// Text shown on the dropdown trigger.
pub fn trigger_label(mode: Mode) -> String {
    format!("{} mode ▾", mode.label())
}

/// Anchor the option list to the trigger. It drops below when it fits and
/// opens upward otherwise, and is shifted left to stay on screen.
fn popup_layout(screen: Rect, trigger: Rect) -> PopupLayout {
    let height = 2 + POPUP_OPTION_HEIGHT * Mode::ALL.len() as u16;
    let width = POPUP_WIDTH.min(screen.width);

    let max_x = screen.right().saturating_sub(width);
    let x = trigger.x.min(max_x).max(screen.x);

    let room_below = screen.bottom().saturating_sub(trigger.bottom());
    let opens_upward = room_below < height;
    let y = if opens_upward {
        trigger.y.saturating_sub(height).max(screen.y)
    } else {
        trigger.bottom()
    };

    let area = Rect {
        x,
        y,
        width,
        height: height.min(screen.height),
    };

    let options = Mode::ALL
        .iter()
        .enumerate()
        .map(|(i, mode)| {
            let rect = Rect {
                x: area.x + 1,
                y: area.y + 1 + i as u16 * POPUP_OPTION_HEIGHT,
                width: area.width.saturating_sub(2),
                height: POPUP_OPTION_HEIGHT,
            };
            (*mode, rect.intersection(area))
        })
        .collect();

    PopupLayout {
        area,
        options,
        opens_upward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chat_state() -> AppState {
        let mut state = AppState::default();
        state.prompt.set_value("q");
        let _pending = state.submit();
        state
    }

    #[test]
    fn landing_has_hero_and_faq() {
        let state = AppState::default();
        let layout = ScreenLayout::compute(Rect::new(0, 0, 120, 40), &state);

        assert!(layout.hero.is_some());
        assert_eq!(layout.faq_items.len(), FAQ_QUESTIONS.len());
        assert!(layout.transcript.is_none());
        assert_eq!(layout.prompt.block.width, LANDING_WIDTH);
        assert_eq!(layout.footer.y, 39);
    }

    #[test]
    fn chat_has_transcript_above_prompt() {
        let state = chat_state();
        let layout = ScreenLayout::compute(Rect::new(0, 0, 80, 30), &state);

        let transcript = layout.transcript.unwrap();
        assert!(layout.hero.is_none());
        assert!(transcript.bottom() <= layout.prompt.block.y);
        // Single line prompt: borders + text + controls
        assert_eq!(layout.prompt.block.height, 4);
    }

    #[test]
    fn prompt_box_grows_with_text() {
        let mut state = chat_state();
        state.prompt.set_value("one\ntwo\nthree");
        let layout = ScreenLayout::compute(Rect::new(0, 0, 80, 30), &state);
        assert_eq!(layout.prompt.text.height, 3);
    }

    #[test]
    fn popup_opens_upward_at_bottom_of_screen() {
        let mut state = chat_state();
        state.selector.toggle(state.mode());
        let layout = ScreenLayout::compute(Rect::new(0, 0, 80, 30), &state);

        let popup = layout.mode_popup.unwrap();
        assert!(popup.opens_upward);
        assert_eq!(popup.area.bottom(), layout.prompt.mode_trigger.y);
        assert_eq!(popup.options.len(), 2);
    }

    #[test]
    fn popup_drops_below_when_there_is_room() {
        let mut state = AppState::default();
        state.selector.toggle(state.mode());
        // Tall screen: the landing prompt sits mid-screen
        let layout = ScreenLayout::compute(Rect::new(0, 0, 100, 60), &state);

        let popup = layout.mode_popup.unwrap();
        assert!(!popup.opens_upward);
        assert_eq!(popup.area.y, layout.prompt.mode_trigger.bottom());
    }

    #[test]
    fn popup_follows_resize() {
        let mut state = chat_state();
        state.selector.toggle(state.mode());

        let small = ScreenLayout::compute(Rect::new(0, 0, 60, 20), &state);
        let large = ScreenLayout::compute(Rect::new(0, 0, 160, 50), &state);

        let (small, large) = (small.mode_popup.unwrap(), large.mode_popup.unwrap());
        assert_ne!(small.area, large.area);
        assert!(large.area.x > small.area.x);
    }

    #[test]
    fn hit_testing() {
        let mut state = chat_state();
        let layout = ScreenLayout::compute(Rect::new(0, 0, 80, 30), &state);

        let send = layout.prompt.send;
        assert_eq!(layout.hit(send.x, send.y), Hit::Send);
        let trigger = layout.prompt.mode_trigger;
        assert_eq!(layout.hit(trigger.x, trigger.y), Hit::ModeTrigger);
        assert_eq!(layout.hit(40, 2), Hit::Transcript);

        state.selector.toggle(state.mode());
        let layout = ScreenLayout::compute(Rect::new(0, 0, 80, 30), &state);
        let (mode, rect) = layout.mode_popup.as_ref().unwrap().options[1];
        assert_eq!(layout.hit(rect.x, rect.y), Hit::ModeOption(mode));
        let area = layout.mode_popup.as_ref().unwrap().area;
        assert_eq!(layout.hit(area.x, area.y), Hit::ModePopup);
    }

    #[test]
    fn faq_items_are_hittable() {
        let state = AppState::default();
        let layout = ScreenLayout::compute(Rect::new(0, 0, 100, 40), &state);
        let item = layout.faq_items[2];
        assert_eq!(layout.hit(item.x + 3, item.y), Hit::FaqItem(2));
    }
}
