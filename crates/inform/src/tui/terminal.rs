use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use eyre::{Context, Result, bail};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{IsTerminal, Stdout, stdout};

/// Undo everything [`TerminalGuard::new`] set up. Errors are ignored; this
/// runs on the way out.
fn restore_terminal() {
    let _ = execute!(
        stdout(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    );
    let _ = disable_raw_mode();
}

/// Install a panic hook that restores the terminal before the panic message
/// is printed, so the message is readable and the shell still works.
///
/// Call this once, before creating the [`TerminalGuard`].
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));
}

/// Guards terminal lifecycle, ensuring proper setup and cleanup.
///
/// # Lifecycle
/// - **Setup** (`new()`): raw mode, alternate screen, mouse capture,
///   bracketed paste
/// - **Cleanup** (`Drop`): undoes all of the above in reverse
///
/// Mouse capture is what lets clicks outside the mode dropdown close it.
/// Bracketed paste delivers pasted text as one event, so its newlines are
/// not read as Enter presses.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    /// # Errors
    /// - Returns error if stdout is not a terminal (e.g., piped or redirected)
    /// - Returns error if terminal initialization fails
    pub fn new() -> Result<Self> {
        if !stdout().is_terminal() {
            bail!(
                "inform chat requires a terminal (TTY) but stdout is not a terminal. \
                 Use `inform ask` for piped or scripted use."
            );
        }

        enable_raw_mode().context("failed to enable raw mode")?;

        if let Err(e) = execute!(
            stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        ) {
            restore_terminal();
            return Err(e).context("failed to enter alternate screen");
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout())) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore_terminal();
                return Err(e).context("failed to create terminal");
            }
        };

        Ok(Self { terminal })
    }

    /// Get mutable reference to the underlying terminal.
    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        restore_terminal();
    }
}
