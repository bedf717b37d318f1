//! The conversation orchestrator.
//!
//! [`Conversation`] owns everything a session knows: the transcript, the
//! selected [`Mode`], how many questions are waiting on the backend, and
//! which screen should be shown. Views only read it; all mutation goes
//! through the methods here.
//!
//! A turn is two halves. [`Conversation::begin_send`] appends the user's
//! message straight away and hands back the request to issue;
//! [`Conversation::finish_send`] turns whatever the backend said (or the
//! error it raised) into exactly one assistant message. Event-loop drivers
//! call the halves separately so the UI keeps running while a request is in
//! flight. [`Conversation::handle_send`] runs both for callers that can just
//! await.
//!
//! Submissions are never refused while another question is outstanding.
//! Answers are appended in the order they arrive, which is not necessarily
//! the order they were asked.

use std::fmt::Display;

use tracing::{debug, info, warn};

use crate::api::{ApiError, AskBackend};
use crate::models::{AskRequest, AskResponse, Message, Mode};

pub const ERROR_PREFIX: &str = "Error talking to backend:";
const GENERIC_ERROR: &str = "Something went wrong";
const REFERENCES_HEADER: &str = "\n\nReferences:\n";

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Nothing has been asked yet.
    Landing,
    /// At least one message has existed. There is no way back to `Landing`.
    Chat,
}

/// Strictly increasing message ids derived from the wall clock (Unix ms).
#[derive(Debug, Default)]
pub struct MessageIds {
    last: u64,
}

impl MessageIds {
    pub fn next_id(&mut self) -> u64 {
        let now_ms = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000)
            .max(0) as u64;
        self.last = now_ms.max(self.last + 1);
        self.last
    }
}

/// A question that has been recorded but not yet answered.
///
/// Hand it back to [`Conversation::finish_send`] together with the outcome.
/// It is deliberately not `Clone`: each pending question settles once.
#[derive(Debug)]
pub struct PendingAsk {
    request: AskRequest,
    user_message_id: u64,
}

impl PendingAsk {
    pub fn request(&self) -> &AskRequest {
        &self.request
    }

    pub fn user_message_id(&self) -> u64 {
        self.user_message_id
    }
}

/// Display content for a successful answer: the answer text, then a
/// references block when the backend cited anything.
pub fn compose_answer(response: &AskResponse) -> String {
    let mut content = response.answer.clone();

    if !response.citations.is_empty() {
        let refs = response
            .citations
            .iter()
            .map(|c| c.reference_line())
            .collect::<Vec<_>>()
            .join("\n");
        content.push_str(REFERENCES_HEADER);
        content.push_str(&refs);
    }

    content
}

/// Display content for a failed turn.
pub fn error_content(error: &dyn Display) -> String {
    let message = error.to_string();
    let message = message.trim();
    if message.is_empty() {
        format!("{ERROR_PREFIX} {GENERIC_ERROR}")
    } else {
        format!("{ERROR_PREFIX} {message}")
    }
}

#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    mode: Mode,
    in_flight: usize,
    entered_chat: bool,
    ids: MessageIds,
}

impl Conversation {
    pub fn new(mode: Mode) -> Self {
        Self {
            messages: Vec::new(),
            mode,
            in_flight: 0,
            entered_chat: false,
            ids: MessageIds::default(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch modes. Returns false, and changes nothing, when `mode` is
    /// already selected.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if self.mode == mode {
            return false;
        }
        info!(from = %self.mode, to = %mode, "mode changed");
        self.mode = mode;
        true
    }

    /// True while at least one question is waiting on the backend.
    pub fn is_thinking(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn view(&self) -> View {
        if self.entered_chat {
            View::Chat
        } else {
            View::Landing
        }
    }

    fn push(&mut self, message: Message) -> &Message {
        self.entered_chat = true;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Record the user's question and return the request to send.
    ///
    /// Returns `None` without touching any state when `text` is empty after
    /// trimming.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingAsk> {
        let query = text.trim();
        if query.is_empty() {
            return None;
        }

        let id = self.ids.next_id();
        self.push(Message::user(id, query));
        self.in_flight += 1;

        debug!(id, mode = %self.mode, in_flight = self.in_flight, "question submitted");

        Some(PendingAsk {
            request: AskRequest::new(self.mode, query),
            user_message_id: id,
        })
    }

    /// Settle a pending question with the backend's outcome. Always appends
    /// exactly one assistant message and always releases the in-flight slot.
    pub fn finish_send(
        &mut self,
        pending: PendingAsk,
        result: Result<AskResponse, ApiError>,
    ) -> &Message {
        self.in_flight = self.in_flight.saturating_sub(1);
        let id = self.ids.next_id();

        let message = match result {
            Ok(response) => {
                debug!(
                    question = pending.user_message_id,
                    citations = response.citations.len(),
                    "answer appended"
                );
                Message::assistant(id, compose_answer(&response), response.confidence)
            }
            Err(e) => {
                warn!(question = pending.user_message_id, "backend error: {e}");
                Message::assistant(id, error_content(&e), None)
            }
        };

        self.push(message)
    }

    /// Run a whole turn: record the question, ask `backend`, record the answer.
    ///
    /// Returns the assistant message, or `None` if `text` was blank.
    pub async fn handle_send<B>(&mut self, backend: &B, text: &str) -> Option<&Message>
    where
        B: AskBackend + ?Sized,
    {
        let pending = self.begin_send(text)?;
        let result = backend.ask(pending.request()).await;
        Some(self.finish_send(pending, result))
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerBackend, Author, Citation, Confidence, ConfidenceLabel};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn response(answer: &str, citations: Vec<Citation>) -> AskResponse {
        AskResponse {
            answer: answer.to_string(),
            mode: "beginner".to_string(),
            query: "q".to_string(),
            backend: AnswerBackend::Llm,
            citations,
            confidence: Some(Confidence {
                value: 64.0,
                label: ConfidenceLabel::Medium,
            }),
        }
    }

    /// Answers from a script and remembers what it was asked.
    struct ScriptedBackend {
        replies: Mutex<Vec<Result<AskResponse, ApiError>>>,
        seen: Mutex<Vec<AskRequest>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<AskResponse, ApiError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AskBackend for ScriptedBackend {
        async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies.lock().unwrap().remove(0)
        }
    }

    #[tokio::test]
    async fn send_appends_user_then_assistant() {
        let backend = ScriptedBackend::new(vec![Ok(response("Yes.", vec![]))]);
        let mut convo = Conversation::default();

        let reply = convo
            .handle_send(&backend, "  is creatine safe?  ")
            .await
            .unwrap();
        assert_eq!(reply.content, "Yes.");

        let messages = convo.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].author, Author::User);
        assert_eq!(messages[0].content, "is creatine safe?");
        assert_eq!(messages[1].author, Author::Assistant);
        assert_eq!(
            messages[1].confidence.map(|c| c.label),
            Some(ConfidenceLabel::Medium)
        );
        assert!(messages[0].id < messages[1].id);
        assert!(!convo.is_thinking());

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].query, "is creatine safe?");
        assert_eq!(seen[0].mode, Mode::Beginner);
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let backend = ScriptedBackend::new(vec![]);
        let mut convo = Conversation::default();

        for blank in ["", "   ", "\n\t "] {
            assert!(convo.handle_send(&backend, blank).await.is_none());
        }

        assert!(convo.messages().is_empty());
        assert_eq!(convo.view(), View::Landing);
        assert!(!convo.is_thinking());
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn user_message_lands_before_the_answer() {
        let mut convo = Conversation::default();

        let pending = convo.begin_send("how much protein?").unwrap();
        assert_eq!(convo.messages().len(), 1);
        assert!(convo.is_thinking());
        assert_eq!(convo.view(), View::Chat);
        assert_eq!(pending.request().query, "how much protein?");
        assert_eq!(pending.user_message_id(), convo.messages()[0].id);

        convo.finish_send(pending, Ok(response("About 1.6 g/kg.", vec![])));
        assert_eq!(convo.messages().len(), 2);
        assert!(!convo.is_thinking());
    }

    #[test]
    fn references_follow_citation_order() {
        let citations = vec![
            Citation {
                index: 2,
                study_id: 7,
                title: Some("Protein timing".to_string()),
            },
            Citation {
                index: 1,
                study_id: 42,
                title: None,
            },
        ];

        assert_eq!(
            compose_answer(&response("Answer.", citations)),
            "Answer.\n\nReferences:\n[2] Protein timing\n[1] Study 42"
        );
    }

    #[test]
    fn untitled_citation_ends_content() {
        let content = compose_answer(&response(
            "Creatine is safe.",
            vec![Citation {
                index: 1,
                study_id: 42,
                title: None,
            }],
        ));
        assert!(content.ends_with("References:\n[1] Study 42"));
    }

    #[tokio::test]
    async fn http_error_becomes_one_assistant_message() {
        let backend = ScriptedBackend::new(vec![Err(ApiError::Status(500))]);
        let mut convo = Conversation::default();

        convo.handle_send(&backend, "q").await;

        let assistants: Vec<_> = convo
            .messages()
            .iter()
            .filter(|m| m.author == Author::Assistant)
            .collect();
        assert_eq!(assistants.len(), 1);
        assert!(assistants[0].content.starts_with("Error talking to backend:"));
        assert_eq!(
            assistants[0].content,
            "Error talking to backend: Server returned 500"
        );
        assert_eq!(assistants[0].confidence, None);
        assert!(!convo.is_thinking());
    }

    #[test]
    fn empty_error_description_uses_fallback() {
        assert_eq!(
            error_content(&""),
            "Error talking to backend: Something went wrong"
        );
    }

    #[test]
    fn mode_flows_into_requests() {
        let mut convo = Conversation::default();
        assert!(convo.set_mode(Mode::Intermediate));
        assert!(!convo.set_mode(Mode::Intermediate));
        assert_eq!(convo.mode(), Mode::Intermediate);

        let pending = convo.begin_send("q").unwrap();
        assert_eq!(pending.request().mode, Mode::Intermediate);
    }

    #[test]
    fn overlapping_questions_settle_in_arrival_order() {
        let mut convo = Conversation::default();

        let first = convo.begin_send("first").unwrap();
        let second = convo.begin_send("second").unwrap();
        assert_eq!(convo.in_flight(), 2);

        convo.finish_send(second, Ok(response("answer two", vec![])));
        assert!(convo.is_thinking());

        convo.finish_send(first, Err(ApiError::Status(502)));
        assert!(!convo.is_thinking());

        let contents: Vec<_> = convo.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "first",
                "second",
                "answer two",
                "Error talking to backend: Server returned 502"
            ]
        );
    }

    #[test]
    fn chat_view_is_permanent() {
        let mut convo = Conversation::default();
        assert_eq!(convo.view(), View::Landing);

        let pending = convo.begin_send("q").unwrap();
        convo.finish_send(pending, Ok(response("a", vec![])));
        assert_eq!(convo.view(), View::Chat);

        // The transcript is append-only from the outside; clear it from here
        // to check the latch does not depend on the list.
        convo.messages.clear();
        assert_eq!(convo.view(), View::Chat);
    }

    #[test]
    fn ids_strictly_increase() {
        let mut ids = MessageIds::default();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
    }
}
