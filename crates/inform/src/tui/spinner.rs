//! Frame timing for the TUI's small animations: the "thinking" spinner and
//! the landing hero's line reveal.

use std::time::{Duration, Instant};

/// Braille dots shown while a question is with the backend.
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// How often the spinner advances.
pub const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// How long each hero script line takes to fade in.
pub const HERO_REVEAL_INTERVAL: Duration = Duration::from_millis(700);

/// Spinner frame at `index`, wrapping around.
pub fn active_frame(index: usize) -> &'static str {
    SPINNER_FRAMES[index % SPINNER_FRAMES.len()]
}

/// A frame counter that only advances once `interval` has elapsed.
///
/// The event loop ticks much faster than any animation runs, so each
/// animation keeps its own ticker and polls it on every loop tick.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    frame: usize,
    last: Instant,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            frame: 0,
            last: Instant::now(),
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Advance if due. Returns true when the frame changed.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.frame = self.frame.wrapping_add(1);
            self.last = now;
            true
        } else {
            false
        }
    }
}
