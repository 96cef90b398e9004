//! Search bar that edits a table's filter text live.
//!
//! While active, typed characters go straight into the table's search text,
//! so the row list narrows on every key press. Enter keeps the filter and
//! leaves search mode; Esc clears it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::table::TableView;

/// Search mode state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchBar {
    active: bool,
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Apply a key to `view`'s search text. Returns true if the key was used.
    pub fn handle_input(&mut self, view: &mut TableView, key: KeyEvent) -> bool {
        if !self.active {
            return false;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.active = false,
            (KeyCode::Esc, _) => {
                view.set_search("");
                self.active = false;
            }
            (KeyCode::Backspace, _) => {
                view.pop_search_char();
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => view.set_search(""),
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                view.push_search_char(c)
            }
            _ => return false,
        }
        true
    }

    /// Render `/query` while active, or the applied filter when inactive.
    pub fn render(&self, frame: &mut Frame, area: Rect, view: &TableView) {
        let query = view.search();
        if !self.active && query.is_empty() {
            return;
        }

        let (text, style) = if self.active {
            (format!("/{}", query), Style::default().fg(Color::Yellow))
        } else {
            (
                format!("/{} [{} matches]", query, view.visible().len()),
                Style::default().fg(Color::DarkGray),
            )
        };
        frame.render_widget(Paragraph::new(text).style(style), area);

        if self.active {
            let x = area.x + 1 + query.chars().count() as u16;
            frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Record;
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn view() -> TableView {
        let mut view = TableView::new(10);
        let records: Vec<Record> = [json!({"name": "Ana"}), json!({"name": "Bo"})]
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        view.set_records(records);
        view
    }

    #[test]
    fn test_inactive_ignores_keys() {
        let mut bar = SearchBar::new();
        let mut view = view();
        assert!(!bar.handle_input(&mut view, key(KeyCode::Char('a'))));
        assert_eq!(view.search(), "");
    }

    #[test]
    fn test_typing_filters_live() {
        let mut bar = SearchBar::new();
        let mut view = view();
        bar.activate();
        bar.handle_input(&mut view, key(KeyCode::Char('a')));
        bar.handle_input(&mut view, key(KeyCode::Char('n')));
        assert_eq!(view.search(), "an");
        assert_eq!(view.visible().len(), 1);

        bar.handle_input(&mut view, key(KeyCode::Backspace));
        assert_eq!(view.search(), "a");

        bar.handle_input(&mut view, key(KeyCode::Enter));
        assert!(!bar.is_active());
        assert_eq!(view.search(), "a");
    }

    #[test]
    fn test_escape_clears_filter() {
        let mut bar = SearchBar::new();
        let mut view = view();
        bar.activate();
        bar.handle_input(&mut view, key(KeyCode::Char('z')));
        assert!(view.is_empty());
        bar.handle_input(&mut view, key(KeyCode::Esc));
        assert!(!bar.is_active());
        assert_eq!(view.visible().len(), 2);
    }
}
