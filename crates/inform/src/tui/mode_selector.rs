//! The answer-mode dropdown that sits inside the prompt box.
//!
//! The selector only tracks whether its option list is open and which option
//! is highlighted. The selected mode lives in the conversation; callers pass
//! it in and apply whatever change comes back.

use inform_client::Mode;

#[derive(Debug, Clone, Default)]
pub struct ModeSelector {
    open: bool,
    highlighted: usize,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> Mode {
        Mode::ALL[self.highlighted % Mode::ALL.len()]
    }

    /// Open or close the list. Opening highlights the current mode.
    pub fn toggle(&mut self, current: Mode) {
        if self.open {
            self.close();
        } else {
            self.open = true;
            self.highlighted = index_of(current);
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Choose `option` and close. Returns the new mode only when it differs
    /// from `current`.
    pub fn select(&mut self, option: Mode, current: Mode) -> Option<Mode> {
        self.close();
        (option != current).then_some(option)
    }

    /// Choose whatever is highlighted.
    pub fn select_highlighted(&mut self, current: Mode) -> Option<Mode> {
        let option = self.highlighted();
        self.select(option, current)
    }

    /// Move the highlight by `delta`, stopping at either end.
    pub fn move_highlight(&mut self, delta: isize) {
        let last = Mode::ALL.len() as isize - 1;
        self.highlighted = (self.highlighted as isize + delta).clamp(0, last) as usize;
    }
}

fn index_of(mode: Mode) -> usize {
    Mode::ALL.iter().position(|m| *m == mode).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_opens_on_current_mode() {
        let mut selector = ModeSelector::new();
        assert!(!selector.is_open());

        selector.toggle(Mode::Intermediate);
        assert!(selector.is_open());
        assert_eq!(selector.highlighted(), Mode::Intermediate);

        selector.toggle(Mode::Intermediate);
        assert!(!selector.is_open());
    }

    #[test]
    fn selecting_current_mode_reports_no_change() {
        let mut selector = ModeSelector::new();
        selector.toggle(Mode::Beginner);

        assert_eq!(selector.select(Mode::Beginner, Mode::Beginner), None);
        assert!(!selector.is_open());
    }

    #[test]
    fn selecting_other_mode_reports_it() {
        let mut selector = ModeSelector::new();
        selector.toggle(Mode::Beginner);

        assert_eq!(
            selector.select(Mode::Intermediate, Mode::Beginner),
            Some(Mode::Intermediate)
        );
        assert!(!selector.is_open());
    }

    #[test]
    fn highlight_stays_in_range() {
        let mut selector = ModeSelector::new();
        selector.toggle(Mode::Beginner);

        selector.move_highlight(-1);
        assert_eq!(selector.highlighted(), Mode::Beginner);

        selector.move_highlight(1);
        selector.move_highlight(1);
        assert_eq!(selector.highlighted(), Mode::Intermediate);

        assert_eq!(
            selector.select_highlighted(Mode::Beginner),
            Some(Mode::Intermediate)
        );
    }
}
