//! Help screen listing every key binding.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::logging;

/// Actions returned from the help screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpAction {
    Close,
}

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[("Ctrl+C", "Quit"), ("?", "Show this help"), ("q", "Quit from the dashboard")],
    ),
    (
        "Tables",
        &[
            ("Tab / Shift+Tab", "Next / previous table"),
            ("j / k", "Move selection"),
            ("n / p", "Next / previous page"),
            ("/", "Search all columns"),
            ("1-9", "Sort by column; again to reverse"),
            ("0", "Clear sort"),
            ("r", "Refresh from the server"),
        ],
    ),
    (
        "Actions",
        &[
            ("a", "New registration or competition"),
            ("e", "Edit my profile"),
            ("c", "Browse site content"),
            ("t", "Toggle a user's role (admin)"),
            ("d", "Delete the selected row (admin)"),
            ("S", "Sign out"),
        ],
    ),
    (
        "Forms",
        &[
            ("Tab / Shift+Tab", "Next / previous field"),
            ("Ctrl+S", "Submit"),
            ("Esc", "Cancel"),
        ],
    ),
    (
        "Content",
        &[
            ("Tab", "Switch news / competitions"),
            ("o", "Open the page in a browser"),
            ("Esc", "Back to the dashboard"),
        ],
    ),
];

/// The help screen.
#[derive(Debug, Default)]
pub struct HelpView {
    scroll: u16,
}

impl HelpView {
    pub fn new() -> Self {
        Self::default()
    }

    fn lines() -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (title, bindings) in SECTIONS {
            lines.push(Line::styled(
                *title,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
            for (key, description) in bindings.iter() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<16}", key), Style::default().fg(Color::Cyan)),
                    Span::raw(*description),
                ]));
            }
            lines.push(Line::raw(""));
        }
        if let Some(dir) = logging::log_directory() {
            lines.push(Line::styled(
                format!("Logs: {}", dir.display()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<HelpAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Char('?'), _) => {
                self.scroll = 0;
                Some(HelpAction::Close)
            }
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                let max = Self::lines().len().saturating_sub(1) as u16;
                self.scroll = (self.scroll + 1).min(max);
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(Self::lines())
            .scroll((self.scroll, 0))
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(paragraph, area);
    }
}
