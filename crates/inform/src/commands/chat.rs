//! `inform chat`: the full-screen conversation UI.

use std::sync::Arc;

use eyre::{Result, WrapErr};
use inform_client::{AskBackend, HttpBackend, Mode, PendingAsk, Settings};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::tui::event::Answer;
use crate::tui::{
    App, AppEvent, AppState, EventLoop, RenderContext, TerminalGuard, Theme, install_panic_hook,
    render,
};

pub async fn run(settings: &Settings, mode: Mode) -> Result<()> {
    let backend: Arc<dyn AskBackend> = Arc::new(
        HttpBackend::new(&settings.api_base)
            .wrap_err_with(|| format!("invalid api_base '{}'", settings.api_base))?,
    );
    info!(api_base = %settings.api_base, %mode, "starting chat");

    install_panic_hook();
    let mut guard = TerminalGuard::new()?;

    let theme = Theme::default();
    let ctx = RenderContext { theme: &theme };
    let mut app = App::new(AppState::new(mode));
    let mut event_loop = EventLoop::new();
    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            guard.terminal().draw(|frame| {
                app.set_area(frame.area());
                render(frame, &app.state, &ctx);
            })?;
        }

        needs_redraw = match event_loop.run().await? {
            AppEvent::Key(key) => app.handle_key(key),
            AppEvent::Mouse(mouse) => app.handle_mouse(mouse),
            AppEvent::Paste(text) => app.handle_paste(&text),
            AppEvent::Tick => app.state.tick(),
            AppEvent::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                true
            }
            AppEvent::Answer(answer) => {
                let (pending, result) = *answer;
                app.state.apply_answer(pending, result);
                true
            }
        };

        for pending in app.drain_outgoing() {
            spawn_ask(Arc::clone(&backend), pending, event_loop.answer_sender());
        }

        if app.state.should_exit {
            event_loop.shutdown();
        }
        if event_loop.is_shutdown() {
            break;
        }
    }

    info!(
        messages = app.state.conversation.messages().len(),
        unanswered = app.state.conversation.in_flight(),
        "chat closed"
    );
    Ok(())
}

/// Run one request in the background and report the outcome on `answers`.
/// Requests are independent: several may be in flight and they report back
/// in whatever order they finish.
fn spawn_ask(
    backend: Arc<dyn AskBackend>,
    pending: PendingAsk,
    answers: mpsc::UnboundedSender<Answer>,
) {
    debug!(question = pending.user_message_id(), "sending question");
    tokio::spawn(async move {
        let result = backend.ask(pending.request()).await;
        // Only fails once the UI has exited and nobody is listening
        let _ = answers.send((pending, result));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inform_client::models::AnswerBackend;
    use inform_client::{ApiError, AskRequest, AskResponse, Author, View};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    /// Answers after a per-question delay, echoing the query.
    struct SlowEcho;

    #[async_trait]
    impl AskBackend for SlowEcho {
        async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
            let delay = if request.query == "slow" { 50 } else { 1 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if request.query == "fail" {
                return Err(ApiError::Status(503));
            }
            Ok(AskResponse {
                answer: format!("echo: {}", request.query),
                mode: request.mode.to_string(),
                query: request.query.clone(),
                backend: AnswerBackend::Baseline,
                citations: vec![],
                confidence: None,
            })
        }
    }

    #[tokio::test]
    async fn answers_are_applied_in_arrival_order() {
        let backend: Arc<dyn AskBackend> = Arc::new(SlowEcho);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(Mode::Beginner);

        for question in ["slow", "fast"] {
            state.prompt.set_value(question);
            let pending = state.submit().unwrap();
            spawn_ask(Arc::clone(&backend), pending, tx.clone());
        }
        assert_eq!(state.conversation.in_flight(), 2);

        for _ in 0..2 {
            let (pending, result) = rx.recv().await.unwrap();
            state.apply_answer(pending, result);
        }

        let contents: Vec<_> = state
            .conversation
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["slow", "fast", "echo: fast", "echo: slow"]);
        assert!(!state.conversation.is_thinking());
    }

    #[tokio::test]
    async fn failed_request_becomes_a_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = AppState::default();
        state.prompt.set_value("fail");
        let pending = state.submit().unwrap();

        spawn_ask(Arc::new(SlowEcho), pending, tx);
        let (pending, result) = rx.recv().await.unwrap();
        state.apply_answer(pending, result);

        let last = state.conversation.messages().last().unwrap();
        assert_eq!(last.author, Author::Assistant);
        assert_eq!(last.content, "Error talking to backend: Server returned 503");
        assert_eq!(state.view(), View::Chat);
    }
}
