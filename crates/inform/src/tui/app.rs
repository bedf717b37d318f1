use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use inform_client::{PendingAsk, View};
use ratatui::layout::Rect;

use super::layout::{Hit, ScreenLayout};
use super::prompt::PromptAction;
use super::render::transcript_max_scroll;
use super::state::AppState;
use super::view_model::{Body, Screen};

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: u16 = 3;

/// Input handling on top of [`AppState`].
///
/// Questions submitted here are queued rather than sent; the caller drains
/// them with [`App::drain_outgoing`] and runs the requests.
pub struct App {
    pub state: AppState,
    /// Last drawn terminal area, for mouse hit-testing and paging
    area: Rect,
    outgoing: Vec<PendingAsk>,
}

impl App {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            area: Rect::default(),
            outgoing: Vec::new(),
        }
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    /// Questions waiting to be sent, oldest first.
    pub fn drain_outgoing(&mut self) -> Vec<PendingAsk> {
        std::mem::take(&mut self.outgoing)
    }

    fn queue(&mut self, pending: Option<PendingAsk>) {
        if let Some(pending) = pending {
            self.outgoing.push(pending);
        }
    }

    /// Handle a key event. Returns true if render is needed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.state.exit();
            return true;
        }

        if self.state.selector.is_open() && self.handle_selector_key(key) {
            return true;
        }

        match key.code {
            KeyCode::Tab => {
                self.state.selector.toggle(self.state.mode());
                return true;
            }
            KeyCode::Esc => {
                if self.state.prompt.is_blank() {
                    self.state.exit();
                }
                return true;
            }
            KeyCode::Char('n') if ctrl && self.state.view() == View::Landing => {
                self.state.cycle_faq(true);
                return true;
            }
            KeyCode::Char('p') if ctrl && self.state.view() == View::Landing => {
                self.state.cycle_faq(false);
                return true;
            }
            KeyCode::PageUp => {
                self.scroll_up(self.page_rows());
                return true;
            }
            KeyCode::PageDown => {
                self.state.scroll_down(self.page_rows());
                return true;
            }
            _ => {}
        }

        match self.state.prompt.handle_key(key) {
            PromptAction::Submitted(text) => {
                let pending = self.state.send(&text);
                self.queue(pending);
                true
            }
            PromptAction::Edited => true,
            PromptAction::Ignored => false,
        }
    }

    /// Handle pasted text. It always lands in the prompt, newlines included,
    /// and never submits. Returns true if render is needed.
    pub fn handle_paste(&mut self, text: &str) -> bool {
        self.state.selector.close();
        self.state.prompt.paste(text) == PromptAction::Edited
    }

    /// Keys the open dropdown consumes. Anything else closes it and is then
    /// handled as usual; returns false in that case.
    fn handle_selector_key(&mut self, key: KeyEvent) -> bool {
        let current = self.state.mode();
        match key.code {
            KeyCode::Up => self.state.selector.move_highlight(-1),
            KeyCode::Down => self.state.selector.move_highlight(1),
            KeyCode::Enter => {
                if let Some(mode) = self.state.selector.select_highlighted(current) {
                    self.state.change_mode(mode);
                }
            }
            KeyCode::Esc | KeyCode::Tab => self.state.selector.close(),
            _ => {
                self.state.selector.close();
                return false;
            }
        }
        true
    }

    /// Handle a mouse event. Returns true if render is needed.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let layout = ScreenLayout::compute(self.area, &self.state);
                self.handle_click(layout.hit(mouse.column, mouse.row));
                true
            }
            MouseEventKind::ScrollUp if self.state.view() == View::Chat => {
                self.scroll_up(WHEEL_ROWS);
                true
            }
            MouseEventKind::ScrollDown if self.state.view() == View::Chat => {
                self.state.scroll_down(WHEEL_ROWS);
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, hit: Hit) {
        let current = self.state.mode();

        if self.state.selector.is_open() {
            match hit {
                Hit::ModeOption(option) => {
                    if let Some(mode) = self.state.selector.select(option, current) {
                        self.state.change_mode(mode);
                    }
                    return;
                }
                Hit::ModePopup => return,
                Hit::ModeTrigger => {
                    self.state.selector.close();
                    return;
                }
                // Outside the dropdown: close it, then treat the click normally
                _ => self.state.selector.close(),
            }
        }

        match hit {
            Hit::ModeTrigger => self.state.selector.toggle(current),
            Hit::Send => {
                let pending = self.state.submit();
                self.queue(pending);
            }
            Hit::FaqItem(index) => self.state.pick_faq(index),
            Hit::ModeOption(_) | Hit::ModePopup | Hit::Prompt | Hit::Transcript | Hit::Nothing => {}
        }
    }

    fn scroll_up(&mut self, rows: u16) {
        let max = self.max_scroll();
        self.state.scroll_up(rows, max);
    }

    /// How far the transcript can scroll at the last drawn size.
    fn max_scroll(&self) -> u16 {
        let layout = ScreenLayout::compute(self.area, &self.state);
        match (layout.transcript, Screen::from_state(&self.state).body) {
            (Some(area), Body::Chat { entries }) => transcript_max_scroll(&entries, area),
            _ => 0,
        }
    }

    fn page_rows(&self) -> u16 {
        (self.area.height / 2).max(1)
    }
}
