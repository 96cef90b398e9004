//! Content browser for the news and competition pages on disk.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};
use serde_json::Value;

use crate::content::{Category, ContentEntry};
use crate::ui::components::{handle_table_key, render_table, SearchBar};
use crate::table::TableView;

/// Columns shown for content entries.
const COLUMNS: [&str; 3] = ["slug", "title", "date"];

/// Actions returned from the content browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentAction {
    /// Open this public URL in the browser.
    Open(String),
    Close,
}

/// The content browser screen.
#[derive(Debug)]
pub struct ContentView {
    entries: Vec<ContentEntry>,
    category: Category,
    view: TableView,
    search: SearchBar,
    site_url: String,
}

impl ContentView {
    pub fn new(entries: Vec<ContentEntry>, site_url: impl Into<String>, page_size: usize) -> Self {
        let mut content = Self {
            entries,
            category: Category::News,
            view: TableView::new(page_size).with_columns(COLUMNS),
            search: SearchBar::new(),
            site_url: site_url.into(),
        };
        content.load_category();
        content
    }

    fn load_category(&mut self) {
        let records = self
            .entries
            .iter()
            .filter(|e| e.category == self.category)
            .map(ContentEntry::as_record)
            .collect();
        self.view.set_records(records);
    }

    fn selected_entry(&self) -> Option<&ContentEntry> {
        let slug = self.view.selected_record()?.get("slug").and_then(Value::as_str)?;
        self.entries
            .iter()
            .find(|e| e.category == self.category && e.slug == slug)
    }

    /// Public URL of the selected entry.
    pub fn selected_url(&self) -> Option<String> {
        let entry = self.selected_entry()?;
        Some(format!("{}{}", self.site_url.trim_end_matches('/'), entry.route()))
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ContentAction> {
        if self.search.is_active() {
            self.search.handle_input(&mut self.view, key);
            return None;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                Some(ContentAction::Close)
            }
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => {
                self.category = match self.category {
                    Category::News => Category::Competitions,
                    Category::Competitions => Category::News,
                };
                self.load_category();
                None
            }
            (KeyCode::Char('/'), KeyModifiers::NONE) => {
                self.search.activate();
                None
            }
            (KeyCode::Char('o'), KeyModifiers::NONE) => {
                self.selected_url().map(ContentAction::Open)
            }
            _ => {
                handle_table_key(&mut self.view, key);
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Percentage(60),
                Constraint::Min(3),
            ])
            .split(area);

        let selected = Category::ALL
            .iter()
            .position(|c| *c == self.category)
            .unwrap_or(0);
        let tabs = Tabs::new(Category::ALL.iter().map(|c| Line::from(c.dir_name())))
            .select(selected)
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);

        self.search.render(frame, chunks[1], &self.view);
        render_table(frame, chunks[2], &self.view, "Content", !self.search.is_active());

        let (title, body) = match self.selected_entry() {
            Some(entry) => (entry.title().to_string(), entry.body.as_str()),
            None => ("Preview".to_string(), ""),
        };
        let preview = Paragraph::new(body)
            .block(
                Block::default()
                    .title(format!(" {} ", title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(preview, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_document;
    use std::path::Path;

    fn entries() -> Vec<ContentEntry> {
        vec![
            parse_document(
                Category::News,
                "cup-final",
                "---\ntitle: Cup Final\ndate: 2026-05-01\n---\nWe won.",
                Path::new("cup-final.md"),
            )
            .unwrap(),
            parse_document(Category::Competitions, "nationals", "Body", Path::new("n.md")).unwrap(),
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_starts_on_news() {
        let view = ContentView::new(entries(), "https://fed.example/", 25);
        assert_eq!(view.category, Category::News);
        assert_eq!(view.view.records().len(), 1);
        assert_eq!(
            view.selected_url().as_deref(),
            Some("https://fed.example/news/cup-final")
        );
    }

    #[test]
    fn test_tab_switches_category() {
        let mut view = ContentView::new(entries(), "https://fed.example", 25);
        view.handle_input(key(KeyCode::Tab));
        assert_eq!(view.category, Category::Competitions);
        assert_eq!(
            view.handle_input(key(KeyCode::Char('o'))),
            Some(ContentAction::Open(
                "https://fed.example/competitions/nationals".to_string()
            ))
        );
    }

    #[test]
    fn test_search_filters_entries() {
        let mut view = ContentView::new(entries(), "https://fed.example", 25);
        view.handle_input(key(KeyCode::Char('/')));
        for c in "zzz".chars() {
            view.handle_input(key(KeyCode::Char(c)));
        }
        assert!(view.view.is_empty());
        assert_eq!(view.selected_url(), None);
        view.handle_input(key(KeyCode::Esc));
        assert_eq!(view.handle_input(key(KeyCode::Esc)), Some(ContentAction::Close));
    }
}
