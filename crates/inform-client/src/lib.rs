#![forbid(unsafe_code)]

pub mod api;
pub mod conversation;
pub mod format;
pub mod models;
pub mod settings;

pub use api::{ApiError, AskBackend, HttpBackend};
pub use conversation::{Conversation, PendingAsk, View};
pub use models::{AskRequest, AskResponse, Author, Citation, Confidence, ConfidenceLabel, Message, Mode};
pub use settings::Settings;
