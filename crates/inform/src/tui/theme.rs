//! Semantic colours for the TUI.
//!
//! Widgets ask for a [`Meaning`] rather than a colour so the palette can be
//! swapped in one place.

use ratatui::style::{Color, Modifier, Style};

use inform_client::ConfidenceLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meaning {
    Base,
    Title,
    Guidance,
    Important,
    Muted,
    Annotation,
    AlertError,
    AlertWarn,
    AlertInfo,
    Selected,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub base: Color,
    pub title: Color,
    pub guidance: Color,
    pub important: Color,
    pub muted: Color,
    pub annotation: Color,
    pub error: Color,
    pub warn: Color,
    pub info: Color,
    pub selected_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            base: Color::Reset,
            title: Color::White,
            guidance: Color::Cyan,
            important: Color::LightGreen,
            muted: Color::DarkGray,
            annotation: Color::Gray,
            error: Color::LightRed,
            warn: Color::Yellow,
            info: Color::Green,
            selected_bg: Color::Indexed(236),
        }
    }
}

impl Theme {
    pub fn as_style(&self, meaning: Meaning) -> Style {
        match meaning {
            Meaning::Base => Style::default().fg(self.base),
            Meaning::Title => Style::default()
                .fg(self.title)
                .add_modifier(Modifier::BOLD),
            Meaning::Guidance => Style::default().fg(self.guidance),
            Meaning::Important => Style::default().fg(self.important),
            Meaning::Muted => Style::default().fg(self.muted),
            Meaning::Annotation => Style::default()
                .fg(self.annotation)
                .add_modifier(Modifier::ITALIC),
            Meaning::AlertError => Style::default().fg(self.error),
            Meaning::AlertWarn => Style::default().fg(self.warn),
            Meaning::AlertInfo => Style::default().fg(self.info),
            Meaning::Selected => Style::default().bg(self.selected_bg),
        }
    }

    /// Gauge colour for a confidence label.
    pub fn confidence_style(&self, label: ConfidenceLabel) -> Style {
        match label {
            ConfidenceLabel::High => self.as_style(Meaning::AlertInfo),
            ConfidenceLabel::Medium => self.as_style(Meaning::AlertWarn),
            ConfidenceLabel::Low => self.as_style(Meaning::AlertError),
        }
    }
}
