//! Domain state for the chat TUI.
//!
//! [`AppState`] wraps the session's [`Conversation`] with the bits that only
//! matter on screen: the prompt text, the mode dropdown, the FAQ highlight,
//! transcript scroll and animation timers.

use inform_client::{ApiError, AskResponse, Conversation, Mode, PendingAsk, View};
use tracing::debug;

use super::mode_selector::ModeSelector;
use super::prompt::{PromptInput, PromptVariant};
use super::spinner::{HERO_REVEAL_INTERVAL, SPINNER_INTERVAL, Ticker};

/// Suggested questions on the landing screen.
pub const FAQ_QUESTIONS: [&str; 4] = [
    "Is creatine safe for beginners?",
    "How much creatine should I take per day?",
    "How much protein do I need per day to build muscle?",
    "How many times per week should I train each muscle group?",
];

/// Lines revealed one by one under the landing title.
pub const HERO_SCRIPT: [&str; 3] = [
    "We live in an age where information is everywhere,",
    "yet contradictions and confusion persist, even among experts.",
    "To help you navigate the sea of knowledge, InForm grounds every answer in real research.",
];

/// Reveal ticks the full script stays on screen before starting over.
const HERO_HOLD_TICKS: usize = 4;

pub struct AppState {
    pub conversation: Conversation,
    pub prompt: PromptInput,
    pub selector: ModeSelector,
    /// Highlighted suggested question, if any
    pub faq_selected: Option<usize>,
    /// Rows scrolled up from the bottom of the transcript. Zero follows new
    /// messages.
    pub scroll_from_bottom: u16,
    pub should_exit: bool,
    spinner: Ticker,
    hero: Ticker,
}

impl AppState {
    pub fn new(mode: Mode) -> Self {
        Self {
            conversation: Conversation::new(mode),
            prompt: PromptInput::new(PromptVariant::Hero),
            selector: ModeSelector::new(),
            faq_selected: None,
            scroll_from_bottom: 0,
            should_exit: false,
            spinner: Ticker::new(SPINNER_INTERVAL),
            hero: Ticker::new(HERO_REVEAL_INTERVAL),
        }
    }

    pub fn view(&self) -> View {
        self.conversation.view()
    }

    pub fn mode(&self) -> Mode {
        self.conversation.mode()
    }

    /// Submit the prompt. Returns the question to send, or `None` when the
    /// prompt was blank.
    pub fn submit(&mut self) -> Option<PendingAsk> {
        let text = self.prompt.submit()?;
        self.send(&text)
    }

    /// Send text the prompt has already handed over.
    pub fn send(&mut self, text: &str) -> Option<PendingAsk> {
        self.selector.close();
        self.faq_selected = None;
        self.scroll_from_bottom = 0;
        let pending = self.conversation.begin_send(text);
        if self.view() == View::Chat {
            self.prompt.set_variant(PromptVariant::Chat);
        }
        pending
    }

    /// Record the outcome of a question sent earlier.
    pub fn apply_answer(&mut self, pending: PendingAsk, result: Result<AskResponse, ApiError>) {
        self.conversation.finish_send(pending, result);
        self.scroll_from_bottom = 0;
    }

    /// Highlight a suggested question and copy it into the prompt.
    pub fn pick_faq(&mut self, index: usize) {
        if let Some(question) = FAQ_QUESTIONS.get(index) {
            debug!(index, "suggested question picked");
            self.faq_selected = Some(index);
            self.prompt.set_value(question);
        }
    }

    /// Step the FAQ highlight forward or back, wrapping, and pick it.
    pub fn cycle_faq(&mut self, forward: bool) {
        let len = FAQ_QUESTIONS.len();
        let next = match (self.faq_selected, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.pick_faq(next);
    }

    pub fn change_mode(&mut self, mode: Mode) -> bool {
        self.conversation.set_mode(mode)
    }

    /// Scroll towards the first message, stopping at `max` rows from the
    /// bottom.
    pub fn scroll_up(&mut self, rows: u16, max: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(rows).min(max);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(rows);
    }

    pub fn exit(&mut self) {
        self.should_exit = true;
    }

    /// Advance whichever animation is on screen. Returns true when a redraw
    /// is needed.
    pub fn tick(&mut self) -> bool {
        match self.view() {
            View::Landing => self.hero.poll(),
            View::Chat if self.conversation.is_thinking() => self.spinner.poll(),
            View::Chat => false,
        }
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner.frame()
    }

    /// How many hero lines are currently visible.
    pub fn hero_revealed(&self) -> usize {
        hero_lines_at(self.hero.frame())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

fn hero_lines_at(frame: usize) -> usize {
    let cycle = HERO_SCRIPT.len() + HERO_HOLD_TICKS;
    (frame % cycle + 1).min(HERO_SCRIPT.len())
}
