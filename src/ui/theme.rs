//! Color themes.

use ratatui::style::{Color, Style};

/// Colors for the app chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            accent: Color::Blue,
            muted: Color::Gray,
        }
    }

    /// Theme by config name. Unknown names fall back to dark.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.muted)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
