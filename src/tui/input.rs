use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

use super::form::FormAction;

/// Two clicks on the same row within this window count as a double-click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);

/// Which layer currently receives input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Main,
    Form,
    Popup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleMonitoring,
    OpenConfig,
    MovePrev,
    MoveNext,
    LaunchSelected,
    ClosePopup,
    Form(FormAction),
    None,
}

pub fn map_key(key: KeyEvent, mode: Mode) -> Action {
    // Only handle the initial key press; ignore Repeat and Release.
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('s') if mode == Mode::Form => Action::Form(FormAction::Confirm),
            _ => Action::None,
        };
    }

    match mode {
        Mode::Popup => match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Action::ClosePopup,
            _ => Action::None,
        },
        Mode::Form => match key.code {
            KeyCode::Esc => Action::Form(FormAction::Cancel),
            KeyCode::Enter => Action::Form(FormAction::Confirm),
            KeyCode::Up | KeyCode::BackTab => Action::Form(FormAction::PrevField),
            KeyCode::Down | KeyCode::Tab => Action::Form(FormAction::NextField),
            KeyCode::Left => Action::Form(FormAction::CyclePrev),
            KeyCode::Right => Action::Form(FormAction::CycleNext),
            KeyCode::Backspace => Action::Form(FormAction::Backspace),
            KeyCode::Char(c) => Action::Form(FormAction::Input(c)),
            _ => Action::None,
        },
        Mode::Main => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('s') | KeyCode::Char(' ') => Action::ToggleMonitoring,
            KeyCode::Char('c') => Action::OpenConfig,
            KeyCode::Up | KeyCode::Char('k') => Action::MovePrev,
            KeyCode::Down | KeyCode::Char('j') => Action::MoveNext,
            KeyCode::Enter => Action::LaunchSelected,
            _ => Action::None,
        },
    }
}

/// Turns a stream of single left clicks into double-click detections.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    last: Option<(u16, Instant)>,
    window: Duration,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_WINDOW)
    }
}

impl ClickTracker {
    pub fn new(window: Duration) -> Self {
        Self { last: None, window }
    }

    /// Record a click and report whether it completes a double-click.
    ///
    /// Only the row matters: a line is the clickable unit.
    pub fn register(&mut self, _column: u16, row: u16, at: Instant) -> bool {
        let double = matches!(
            self.last,
            Some((last_row, last_at)) if last_row == row
                && at.saturating_duration_since(last_at) <= self.window
        );
        // A completed double-click must not pair with a third click.
        self.last = if double { None } else { Some((row, at)) };
        double
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn main_mode_bindings() {
        assert_eq!(map_key(press(KeyCode::Char('s')), Mode::Main), Action::ToggleMonitoring);
        assert_eq!(map_key(press(KeyCode::Char('c')), Mode::Main), Action::OpenConfig);
        assert_eq!(map_key(press(KeyCode::Enter), Mode::Main), Action::LaunchSelected);
        assert_eq!(map_key(press(KeyCode::Char('q')), Mode::Main), Action::Quit);
    }

    #[test]
    fn escape_only_closes_layers() {
        assert_eq!(map_key(press(KeyCode::Esc), Mode::Main), Action::None);
        assert_eq!(map_key(press(KeyCode::Esc), Mode::Popup), Action::ClosePopup);
    }

    #[test]
    fn form_mode_captures_text() {
        assert_eq!(
            map_key(press(KeyCode::Char('q')), Mode::Form),
            Action::Form(FormAction::Input('q'))
        );
        assert_eq!(
            map_key(press(KeyCode::Esc), Mode::Form),
            Action::Form(FormAction::Cancel)
        );
    }

    #[test]
    fn ctrl_c_always_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [Mode::Main, Mode::Form, Mode::Popup] {
            assert_eq!(map_key(key, mode), Action::Quit);
        }
    }

    #[test]
    fn popup_only_closes() {
        assert_eq!(map_key(press(KeyCode::Enter), Mode::Popup), Action::ClosePopup);
        assert_eq!(map_key(press(KeyCode::Char('s')), Mode::Popup), Action::None);
    }

    #[test]
    fn double_click_on_same_row_within_window() {
        let mut tracker = ClickTracker::default();
        let t0 = Instant::now();
        assert!(!tracker.register(3, 5, t0));
        assert!(tracker.register(4, 5, t0 + Duration::from_millis(200)));
        // third click starts a new pair
        assert!(!tracker.register(4, 5, t0 + Duration::from_millis(300)));
    }

    #[test]
    fn slow_or_moved_clicks_are_single() {
        let mut tracker = ClickTracker::default();
        let t0 = Instant::now();
        assert!(!tracker.register(0, 5, t0));
        assert!(!tracker.register(0, 6, t0 + Duration::from_millis(100)));
        assert!(!tracker.register(0, 6, t0 + Duration::from_millis(900)));
    }
}
