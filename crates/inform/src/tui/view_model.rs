//! View model types for the TUI.
//!
//! [`Screen::from_state`] derives everything the renderer draws from
//! [`AppState`]. Nothing here holds state of its own.

use inform_client::format::{self, Fragment};
use inform_client::{Author, ConfidenceLabel, Message, Mode, View};

use super::prompt::PromptVariant;
use super::spinner::active_frame;
use super::state::{AppState, FAQ_QUESTIONS, HERO_SCRIPT};

pub const TITLE: &str = "InForm";
pub const FAQ_TITLE: &str = "Commonly asked questions";
pub const USER_TITLE: &str = "You";
pub const THINKING_TEXT: &str = "Thinking with studies…";

/// Confidence shown above an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    /// 0..=100
    pub percent: f64,
    pub label: ConfidenceLabel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    User {
        content: String,
    },
    Assistant {
        gauge: Option<Gauge>,
        /// One fragment per block of the answer
        blocks: Vec<Fragment>,
    },
    Thinking {
        frame: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqItem {
    pub text: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Landing {
        hero_lines: Vec<&'static str>,
        faq: Vec<FaqItem>,
    },
    Chat {
        entries: Vec<Entry>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeOption {
    pub label: &'static str,
    pub tagline: &'static str,
    pub current: bool,
    pub highlighted: bool,
}

/// Complete view model.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub body: Body,
    pub prompt_variant: PromptVariant,
    pub mode: Mode,
    /// Present while the dropdown is open
    pub mode_options: Option<Vec<ModeOption>>,
    pub footer: &'static str,
}

impl Screen {
    pub fn from_state(state: &AppState) -> Self {
        let body = match state.view() {
            View::Landing => landing_body(state),
            View::Chat => chat_body(state),
        };

        let mode = state.mode();
        let mode_options = state.selector.is_open().then(|| {
            Mode::ALL
                .iter()
                .map(|m| ModeOption {
                    label: m.label(),
                    tagline: m.tagline(),
                    current: *m == mode,
                    highlighted: *m == state.selector.highlighted(),
                })
                .collect()
        });

        let footer = if mode_options.is_some() {
            "[↑↓] Choose  [Enter] Select  [Esc] Close"
        } else {
            match state.view() {
                View::Landing => {
                    "[Enter] Ask  [Ctrl+N/P] Suggestions  [Tab] Mode  [Esc] Quit"
                }
                View::Chat => "[Enter] Ask  [Shift+Enter] Newline  [PgUp/PgDn] Scroll  [Tab] Mode",
            }
        };

        Screen {
            body,
            prompt_variant: state.prompt.variant(),
            mode,
            mode_options,
            footer,
        }
    }
}

fn landing_body(state: &AppState) -> Body {
    let hero_lines = HERO_SCRIPT
        .iter()
        .take(state.hero_revealed())
        .copied()
        .collect();

    let faq = FAQ_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, text)| FaqItem {
            text,
            selected: state.faq_selected == Some(i),
        })
        .collect();

    Body::Landing { hero_lines, faq }
}

fn chat_body(state: &AppState) -> Body {
    let mut entries: Vec<Entry> = state
        .conversation
        .messages()
        .iter()
        .map(message_entry)
        .collect();

    if state.conversation.is_thinking() {
        entries.push(Entry::Thinking {
            frame: active_frame(state.spinner_frame()),
        });
    }

    Body::Chat { entries }
}

fn message_entry(message: &Message) -> Entry {
    match message.author {
        Author::User => Entry::User {
            content: message.content.clone(),
        },
        Author::Assistant => Entry::Assistant {
            gauge: message.confidence.map(|c| Gauge {
                percent: c.percent(),
                label: c.label,
                text: format!("{} confidence", c.display_percent()),
            }),
            blocks: answer_blocks(&message.content),
        },
    }
}

/// Split an answer into formatted blocks. Content without any block breaks
/// is one block.
fn answer_blocks(content: &str) -> Vec<Fragment> {
    let blocks = format::split_blocks(content);
    if blocks.is_empty() {
        return vec![format::parse(content)];
    }
    blocks.into_iter().map(format::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use inform_client::format::{Inline, Node};
    use inform_client::models::AnswerBackend;
    use inform_client::{AskResponse, Confidence};
    use pretty_assertions::assert_eq;

    fn answered(answer: &str, confidence: Option<Confidence>) -> AppState {
        let mut state = AppState::default();
        state.prompt.set_value("how much protein?");
        let pending = state.submit().unwrap();
        state.apply_answer(
            pending,
            Ok(AskResponse {
                answer: answer.to_string(),
                mode: "beginner".to_string(),
                query: "how much protein?".to_string(),
                backend: AnswerBackend::Llm,
                citations: vec![],
                confidence,
            }),
        );
        state
    }

    #[test]
    fn landing_screen() {
        let mut state = AppState::default();
        state.pick_faq(2);
        let screen = Screen::from_state(&state);

        assert_eq!(screen.prompt_variant, PromptVariant::Hero);
        let Body::Landing { hero_lines, faq } = screen.body else {
            panic!("expected landing body");
        };
        assert_eq!(hero_lines, vec![HERO_SCRIPT[0]]);
        assert_eq!(faq.len(), 4);
        assert!(faq[2].selected);
        assert!(!faq[0].selected);
    }

    #[test]
    fn thinking_entry_while_in_flight() {
        let mut state = AppState::default();
        state.prompt.set_value("q");
        let _pending = state.submit().unwrap();

        let screen = Screen::from_state(&state);
        assert_eq!(screen.prompt_variant, PromptVariant::Chat);
        let Body::Chat { entries } = screen.body else {
            panic!("expected chat body");
        };
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], Entry::User { ref content } if content == "q"));
        assert!(matches!(entries[1], Entry::Thinking { .. }));
    }

    #[test]
    fn assistant_entry_has_gauge_and_blocks() {
        let state = answered(
            "**Yes.** About 1.6 g/kg.\n\n- spread over meals",
            Some(Confidence {
                value: 72.4,
                label: ConfidenceLabel::High,
            }),
        );
        let Body::Chat { entries } = Screen::from_state(&state).body else {
            panic!("expected chat body");
        };

        let Entry::Assistant { gauge, blocks } = &entries[1] else {
            panic!("expected assistant entry");
        };
        let gauge = gauge.as_ref().unwrap();
        assert_eq!(gauge.text, "72% confidence");
        assert_eq!(gauge.label, ConfidenceLabel::High);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1].nodes,
            vec![Node::List(vec![vec![Inline::Plain(
                "spread over meals".to_string()
            )]])]
        );
    }

    #[test]
    fn error_answers_have_no_gauge() {
        let state = answered("Error talking to backend: Server returned 500", None);
        let Body::Chat { entries } = Screen::from_state(&state).body else {
            panic!("expected chat body");
        };
        assert!(matches!(entries[1], Entry::Assistant { gauge: None, .. }));
    }

    #[test]
    fn open_selector_lists_both_modes() {
        let mut state = AppState::new(Mode::Intermediate);
        state.selector.toggle(state.mode());

        let options = Screen::from_state(&state).mode_options.unwrap();
        assert_eq!(options.len(), 2);
        assert!(options[1].current && options[1].highlighted);
        assert!(!options[0].current);
    }
}
