//! Color constants for the terminal calendar interface.

use ratatui::style::Color;

// One colour per shift so a cell's task markers
// read at a glance across the grid.

/// Used for the morning shift (06:00-12:00).
pub const MORNING_GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for the afternoon shift (12:00-18:00).
pub const AFTERNOON_GREEN: Color = Color::Rgb(0, 120, 60);
/// Used for the night shift (18:00-06:00).
pub const NIGHT_PURPLE: Color = Color::Rgb(86, 60, 92);
