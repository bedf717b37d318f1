use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use eyre::{Result, eyre};
use futures::StreamExt;
use inform_client::{ApiError, AskResponse, PendingAsk};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;

/// Base tick interval for the event loop. Animations keep their own, slower
/// timers and only advance when due.
const BASE_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// A settled question: what was asked and what the backend said.
pub type Answer = (PendingAsk, Result<AskResponse, ApiError>);

/// Application events that drive the TUI state machine.
#[derive(Debug)]
pub enum AppEvent {
    /// Keyboard input (Press events only)
    Key(KeyEvent),

    /// Mouse click or wheel
    Mouse(MouseEvent),

    /// Periodic tick for animations
    Tick,

    /// Pasted text, delivered whole
    Paste(String),

    /// Terminal resize event (width, height)
    Resize(u16, u16),

    /// A backend request finished
    Answer(Box<Answer>),
}

/// Async event loop with prioritized event handling.
///
/// # Priority Model (Biased Select)
/// 1. **Answers** - a finished request is applied before anything else
/// 2. **Terminal input** - keys, mouse and resizes
/// 3. **Tick events** - animation frames
///
/// # Graceful Shutdown
/// - SIGINT (Ctrl+C) sets the shutdown flag
/// - EventStream close (stdin EOF) triggers shutdown
pub struct EventLoop {
    /// Terminal event stream (created lazily on first run, needs a TTY)
    reader: Option<EventStream>,
    answers_tx: mpsc::UnboundedSender<Answer>,
    answers_rx: mpsc::UnboundedReceiver<Answer>,

    /// Tick interval timer (created lazily on first run)
    tick_timer: Option<time::Interval>,

    /// Shutdown flag - when true, event loop will terminate
    shutdown: bool,
}

impl EventLoop {
    pub fn new() -> Self {
        let (answers_tx, answers_rx) = mpsc::unbounded_channel();
        Self {
            reader: None,
            answers_tx,
            answers_rx,
            tick_timer: None,
            shutdown: false,
        }
    }

    /// Sender for request tasks to report back on. Each task gets a clone.
    pub fn answer_sender(&self) -> mpsc::UnboundedSender<Answer> {
        self.answers_tx.clone()
    }

    /// Wait for the next application event.
    ///
    /// # Errors
    /// Returns an error if the terminal event stream fails.
    pub async fn run(&mut self) -> Result<AppEvent> {
        let reader = self.reader.get_or_insert_with(EventStream::new);
        let tick_timer = self.tick_timer.get_or_insert_with(|| {
            let mut interval = time::interval(BASE_TICK_INTERVAL);
            // Skip the first immediate tick
            interval.reset();
            interval
        });

        loop {
            if self.shutdown {
                break;
            }

            let event = tokio::select! {
                biased;

                Some(answer) = self.answers_rx.recv() => {
                    Some(AppEvent::Answer(Box::new(answer)))
                }

                maybe_event = reader.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            // Filter to Press events only for cross-platform safety
                            (key.kind == KeyEventKind::Press).then_some(AppEvent::Key(key))
                        }
                        Some(Ok(Event::Mouse(mouse))) => match mouse.kind {
                            MouseEventKind::Down(_)
                            | MouseEventKind::ScrollUp
                            | MouseEventKind::ScrollDown => Some(AppEvent::Mouse(mouse)),
                            _ => None,
                        },
                        Some(Ok(Event::Paste(text))) => Some(AppEvent::Paste(text)),
                        Some(Ok(Event::Resize(w, h))) => Some(AppEvent::Resize(w, h)),
                        Some(Err(e)) => {
                            return Err(eyre!("terminal event error: {}", e));
                        }
                        None => {
                            // EventStream closed (stdin EOF) - trigger shutdown
                            self.shutdown = true;
                            None
                        }
                        // Focus events are not used
                        _ => None,
                    }
                }

                _ = tick_timer.tick() => {
                    Some(AppEvent::Tick)
                }

                _ = tokio::signal::ctrl_c() => {
                    self.shutdown = true;
                    Some(AppEvent::Tick)
                }
            };

            if let Some(app_event) = event {
                return Ok(app_event);
            }
        }

        // Loop exited due to shutdown - return final tick to allow cleanup
        Ok(AppEvent::Tick)
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    pub fn shutdown(&mut self) {
        self.shutdown = true;
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
