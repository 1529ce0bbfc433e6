//! Turns raw press/release edges into click gestures.
//!
//! A single timing state machine is shared by all keys: only one key sequence
//! can be in progress at a time, and pressing a different key abandons the
//! current sequence without emitting anything for it.
//!
//! Two windows drive classification:
//! * the double-click window separates a single click from a double click.
//!   The double click fires on the second press-down, the single click fires
//!   from [`KeyClassifier::poll`] once the window has elapsed after release.
//! * the long-press window fires from [`KeyClassifier::poll`] while the key
//!   is still held, independent of when it is eventually released.

use std::time::{Duration, Instant};

pub const DEFAULT_DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(300);
pub const DEFAULT_LONG_PRESS_WINDOW: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    SingleClick,
    DoubleClick,
    LongPress,
}

/// A completed gesture on the key with the given input code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAction {
    pub code: u16,
    pub gesture: Gesture,
}

#[derive(Debug, Default)]
struct KeyState {
    active_code: Option<u16>,
    click_count: u8,
    is_pressed: bool,
    last_press: Option<Instant>,
    last_release: Option<Instant>,
}

pub struct KeyClassifier {
    double_click_window: Duration,
    long_press_window: Duration,
    state: KeyState,
}

impl Default for KeyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK_WINDOW, DEFAULT_LONG_PRESS_WINDOW)
    }
}

impl KeyClassifier {
    pub fn new(double_click_window: Duration, long_press_window: Duration) -> Self {
        Self {
            double_click_window,
            long_press_window,
            state: KeyState::default(),
        }
    }

    /// Whether a key is currently held down and has not yet produced a
    /// gesture.
    pub fn is_holding(&self) -> bool {
        self.state.is_pressed
    }

    /// Record a press-down edge. Returns a double click if this press
    /// completes one.
    pub fn press(&mut self, code: u16, now: Instant) -> Option<KeyAction> {
        let state = &mut self.state;
        state.is_pressed = true;
        state.last_press = Some(now);

        let within_window = state
            .last_release
            .is_some_and(|released| now.saturating_duration_since(released) < self.double_click_window);

        if state.active_code != Some(code) || !within_window {
            state.active_code = Some(code);
            state.click_count = 1;
            return None;
        }

        state.click_count += 1;
        if state.click_count == 2 {
            return Some(self.emit(code, Gesture::DoubleClick));
        }
        None
    }

    /// Record a release edge. Releases never produce a gesture on their own.
    pub fn release(&mut self, now: Instant) {
        self.state.is_pressed = false;
        self.state.last_release = Some(now);
    }

    /// Time-based check, run once per loop tick.
    pub fn poll(&mut self, now: Instant) -> Option<KeyAction> {
        let code = self.state.active_code?;

        if self.state.is_pressed {
            let held_for = self
                .state
                .last_press
                .map(|pressed| now.saturating_duration_since(pressed))
                .unwrap_or_default();
            if held_for >= self.long_press_window {
                // a long press consumes the whole cycle, pending clicks included
                return Some(self.emit(code, Gesture::LongPress));
            }
            return None;
        }

        if self.state.click_count == 1 {
            let since_release = self
                .state
                .last_release
                .map(|released| now.saturating_duration_since(released))
                .unwrap_or_default();
            if since_release >= self.double_click_window {
                return Some(self.emit(code, Gesture::SingleClick));
            }
        }
        None
    }

    fn emit(&mut self, code: u16, gesture: Gesture) -> KeyAction {
        self.state.is_pressed = false;
        self.state.click_count = 0;
        KeyAction { code, gesture }
    }
}
