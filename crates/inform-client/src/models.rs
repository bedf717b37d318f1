//! Conversation records and the `/ask` wire types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How much background the backend may assume when it writes an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Beginner,
    Intermediate,
}

impl Mode {
    /// Every mode, in the order the selector lists them.
    pub const ALL: [Mode; 2] = [Mode::Beginner, Mode::Intermediate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Beginner => "beginner",
            Mode::Intermediate => "intermediate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Beginner => "Beginner",
            Mode::Intermediate => "Intermediate",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            Mode::Beginner => "Plain-language, step-by-step answers",
            Mode::Intermediate => "More detail, assumes some background",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Mode::Beginner),
            "intermediate" => Ok(Mode::Intermediate),
            other => Err(format!(
                "unknown mode '{other}', expected 'beginner' or 'intermediate'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
}

impl ConfidenceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLabel::Low => "low",
            ConfidenceLabel::Medium => "medium",
            ConfidenceLabel::High => "high",
        }
    }
}

/// Backend's certainty in an answer: a 0-100 score plus a coarse label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub value: f64,
    pub label: ConfidenceLabel,
}

impl Confidence {
    /// The score clamped to `0..=100`. NaN counts as zero.
    pub fn percent(&self) -> f64 {
        if self.value.is_nan() {
            return 0.0;
        }
        self.value.clamp(0.0, 100.0)
    }

    /// Whole-number percentage, e.g. `"82%"`.
    pub fn display_percent(&self) -> String {
        format!("{:.0}%", self.percent())
    }
}

/// One turn in the transcript. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub author: Author,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Message {
    pub fn user(id: u64, content: impl Into<String>) -> Self {
        Self {
            id,
            author: Author::User,
            content: content.into(),
            confidence: None,
        }
    }

    pub fn assistant(id: u64, content: impl Into<String>, confidence: Option<Confidence>) -> Self {
        Self {
            id,
            author: Author::Assistant,
            content: content.into(),
            confidence,
        }
    }
}

pub const USE_LLM: bool = true;
pub const TOP_K_PASSAGES: u32 = 10;
pub const MAX_STUDIES: u32 = 3;

/// Body of `POST /ask`. Only `mode` and `query` vary between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub mode: Mode,
    pub query: String,
    pub use_llm: bool,
    pub top_k_passages: u32,
    pub max_studies: u32,
}

impl AskRequest {
    pub fn new(mode: Mode, query: impl Into<String>) -> Self {
        Self {
            mode,
            query: query.into(),
            use_llm: USE_LLM,
            top_k_passages: TOP_K_PASSAGES,
            max_studies: MAX_STUDIES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerBackend {
    Baseline,
    Llm,
}

/// A study backing part of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub index: u32,
    pub study_id: u64,
    #[serde(default)]
    pub title: Option<String>,
}

impl Citation {
    /// `"[index] title"`, falling back to `"[index] Study {study_id}"` when untitled.
    pub fn reference_line(&self) -> String {
        match &self.title {
            Some(title) => format!("[{}] {}", self.index, title),
            None => format!("[{}] Study {}", self.index, self.study_id),
        }
    }
}

/// Body returned by `POST /ask`.
///
/// The backend also sends the raw `studies` it retrieved; those are not used
/// by the client and are dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub mode: String,
    pub query: String,
    pub backend: AnswerBackend,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub confidence: Option<Confidence>,
}
