//! Enumerations for TUI state management.

/// Application state for the terminal calendar interface.
#[derive(Clone, Copy, PartialEq)]
pub enum AppState {
    Calendar,
    DayDetail,
    Help,
}
