//! Terminal theme and color definitions

use crossterm::style::Color;

/// Theme colors for the interactive shell
pub struct Theme {
    /// Color for the user prompt symbol
    pub prompt: Color,
    /// Color for system messages
    pub system: Color,
    /// Color for error messages
    pub error: Color,
    /// Color for dim/secondary info (timestamps, hints)
    pub dim: Color,
    /// Color for success messages
    pub success: Color,
    /// Color for the banner/title
    pub title: Color,
    /// Color for settings values
    pub value: Color,
    /// Color for slash command names
    pub command: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            prompt: Color::Cyan,
            system: Color::DarkYellow,
            error: Color::Red,
            dim: Color::DarkGrey,
            success: Color::Green,
            title: Color::Magenta,
            value: Color::Blue,
            command: Color::Yellow,
        }
    }
}
