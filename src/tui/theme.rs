//! Colours and borders shared by the game screens

use crate::game::score::Accuracy;
use ratatui::style::Color;
use ratatui::symbols::border;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub accent: Color,
    pub border: Color,
    pub warning: Color,
}

impl Palette {
    pub const DEFAULT: Self = Self {
        fg_primary: Color::Rgb(255, 255, 255),
        fg_secondary: Color::Rgb(136, 136, 136),
        accent: Color::Rgb(51, 102, 255),   // #3366ff
        border: Color::Rgb(64, 64, 64),     // #404040
        warning: Color::Rgb(255, 69, 58),   // #ff453a
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub fn border_set() -> border::Set<'static> {
    border::ROUNDED
}

/// Colour of an accuracy band, matching its result-grid square
pub fn accuracy_color(accuracy: Accuracy) -> Color {
    match accuracy {
        Accuracy::Perfect => Color::Rgb(51, 102, 255), // #3366ff
        Accuracy::Great => Color::Rgb(255, 214, 10),   // #ffd60a
        Accuracy::Good => Color::Rgb(255, 159, 10),    // #ff9f0a
        Accuracy::Missed => Color::Rgb(255, 69, 58),   // #ff453a
    }
}
