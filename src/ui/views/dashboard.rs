//! Dashboard: one tab per table the signed-in role may see.
//!
//! Each tab owns a [`TableView`] so search, sort and page survive switching
//! tabs. Rows are fetched the first time a tab is opened and on refresh.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Tabs,
    Frame,
};
use serde_json::Value;

use crate::api::types::{Record, Role, Table};
use crate::form::FormKind;
use crate::table::{value_text, TableView};
use crate::ui::components::{handle_table_key, render_table, render_table_message, SearchBar};

/// Actions returned from the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    Fetch(Table),
    OpenForm(FormKind),
    OpenContent,
    ChangeRole { user_id: String, role: Role },
    ConfirmDelete { table: Table, id: String },
    SignOut,
    Help,
    Quit,
}

#[derive(Debug)]
struct Tab {
    table: Table,
    view: TableView,
    loaded: bool,
    loading: bool,
    /// The last fetch failed; cleared by the next fetch or a successful load.
    failed: bool,
}

/// The dashboard screen.
#[derive(Debug)]
pub struct DashboardView {
    tabs: Vec<Tab>,
    active: usize,
    search: SearchBar,
    role: Role,
}

impl DashboardView {
    /// Build the tabs visible to `role`.
    pub fn new(role: Role, page_size: usize) -> Self {
        let tabs = Table::ALL
            .iter()
            .filter(|table| !table.requires_admin() || role == Role::Admin)
            .map(|&table| Tab {
                table,
                view: TableView::new(page_size).with_columns(table.columns().iter().copied()),
                loaded: false,
                loading: false,
                failed: false,
            })
            .collect();
        Self {
            tabs,
            active: 0,
            search: SearchBar::new(),
            role,
        }
    }

    pub fn active_table(&self) -> Option<Table> {
        self.tabs.get(self.active).map(|t| t.table)
    }

    pub fn active_view(&self) -> Option<&TableView> {
        self.tabs.get(self.active).map(|t| &t.view)
    }

    fn tab(&self, table: Table) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.table == table)
    }

    fn tab_mut(&mut self, table: Table) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.table == table)
    }

    /// Mark a fetch as started. Returns the action to spawn it.
    pub fn begin_fetch(&mut self, table: Table) -> Option<DashboardAction> {
        let tab = self.tab_mut(table)?;
        tab.loading = true;
        tab.failed = false;
        Some(DashboardAction::Fetch(table))
    }

    /// Fetch the active tab if it has never been loaded.
    pub fn fetch_if_needed(&mut self) -> Option<DashboardAction> {
        let table = self.active_table()?;
        match self.tab(table) {
            Some(tab) if !tab.loaded && !tab.loading => self.begin_fetch(table),
            _ => None,
        }
    }

    /// Store fetched rows. Search and sort are kept.
    pub fn set_records(&mut self, table: Table, records: Vec<Record>) {
        if let Some(tab) = self.tab_mut(table) {
            tab.view.set_records(records);
            tab.loaded = true;
            tab.loading = false;
            tab.failed = false;
        }
    }

    /// Record a failed fetch. The tab shows a failure message instead of rows.
    pub fn fetch_failed(&mut self, table: Table) {
        if let Some(tab) = self.tab_mut(table) {
            tab.loading = false;
            tab.failed = true;
        }
    }

    /// Message drawn in place of the rows of a tab whose fetch failed.
    pub fn failure_message(&self, table: Table) -> Option<String> {
        self.tab(table)
            .filter(|t| t.failed)
            .map(|t| format!("Failed to load {}", t.table.title().to_lowercase()))
    }

    /// Replace the row whose id matches `record`'s id.
    pub fn replace_row(&mut self, table: Table, record: Record) {
        let Some(tab) = self.tab_mut(table) else {
            return;
        };
        let id_column = table.id_column();
        let Some(id) = record.get(id_column).map(value_text) else {
            return;
        };
        let mut records = tab.view.records().to_vec();
        if let Some(row) = records
            .iter_mut()
            .find(|r| r.get(id_column).map(value_text).as_deref() == Some(id.as_str()))
        {
            *row = record;
            tab.view.set_records(records);
        }
    }

    /// Drop the row with `id`.
    pub fn remove_row(&mut self, table: Table, id: &str) {
        let Some(tab) = self.tab_mut(table) else {
            return;
        };
        let id_column = table.id_column();
        let records: Vec<Record> = tab
            .view
            .records()
            .iter()
            .filter(|r| r.get(id_column).map(value_text).as_deref() != Some(id))
            .cloned()
            .collect();
        tab.view.set_records(records);
    }

    fn switch_tab(&mut self, forward: bool) -> Option<DashboardAction> {
        if self.tabs.is_empty() {
            return None;
        }
        let len = self.tabs.len();
        self.active = if forward {
            (self.active + 1) % len
        } else {
            (self.active + len - 1) % len
        };
        self.fetch_if_needed()
    }

    fn selected_id(&self) -> Option<String> {
        let tab = self.tabs.get(self.active)?;
        tab.view
            .selected_record()?
            .get(tab.table.id_column())
            .filter(|v| !v.is_null())
            .map(value_text)
    }

    fn form_for_active(&self) -> Option<FormKind> {
        match self.active_table()? {
            Table::Players | Table::Registrations => Some(FormKind::Registration),
            Table::Competitions => Some(FormKind::Competition),
            Table::Users => None,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_active()
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<DashboardAction> {
        if self.search.is_active() {
            if let Some(tab) = self.tabs.get_mut(self.active) {
                self.search.handle_input(&mut tab.view, key);
            }
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => Some(DashboardAction::Quit),
            (KeyCode::Char('?'), _) => Some(DashboardAction::Help),
            (KeyCode::Tab, _) => self.switch_tab(true),
            (KeyCode::BackTab, _) => self.switch_tab(false),
            (KeyCode::Char('/'), KeyModifiers::NONE) => {
                self.search.activate();
                None
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => {
                let table = self.active_table()?;
                self.begin_fetch(table)
            }
            (KeyCode::Char('a'), KeyModifiers::NONE) => {
                self.form_for_active().map(DashboardAction::OpenForm)
            }
            (KeyCode::Char('e'), KeyModifiers::NONE) => {
                Some(DashboardAction::OpenForm(FormKind::Profile))
            }
            (KeyCode::Char('c'), KeyModifiers::NONE) => Some(DashboardAction::OpenContent),
            (KeyCode::Char('S'), _) => Some(DashboardAction::SignOut),
            (KeyCode::Char('t'), KeyModifiers::NONE) if self.role == Role::Admin => {
                if self.active_table()? != Table::Users {
                    return None;
                }
                let record = self.active_view()?.selected_record()?;
                let current = record
                    .get("role")
                    .and_then(Value::as_str)
                    .map(Role::parse)
                    .unwrap_or_default();
                let role = match current {
                    Role::Admin => Role::User,
                    Role::User => Role::Admin,
                };
                Some(DashboardAction::ChangeRole {
                    user_id: self.selected_id()?,
                    role,
                })
            }
            (KeyCode::Char('d'), KeyModifiers::NONE) if self.role == Role::Admin => {
                Some(DashboardAction::ConfirmDelete {
                    table: self.active_table()?,
                    id: self.selected_id()?,
                })
            }
            _ => {
                if let Some(tab) = self.tabs.get_mut(self.active) {
                    handle_table_key(&mut tab.view, key);
                }
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
                Constraint::Min(3),
            ])
            .split(area);

        let titles: Vec<Line> = self.tabs.iter().map(|t| Line::from(t.table.title())).collect();
        let tabs = Tabs::new(titles)
            .select(self.active)
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);

        let Some(tab) = self.tabs.get(self.active) else {
            return;
        };
        self.search.render(frame, chunks[1], &tab.view);

        let title = if tab.loading {
            format!("{} (loading...)", tab.table.title())
        } else {
            tab.table.title().to_string()
        };
        let focused = !self.search.is_active();
        match self.failure_message(tab.table) {
            Some(message) => render_table_message(
                frame,
                chunks[2],
                &title,
                &message,
                Style::default().fg(Color::Red),
                focused,
            ),
            None => render_table(frame, chunks[2], &tab.view, &title, focused),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn users() -> Vec<Record> {
        vec![
            record(json!({"id": "u1", "email": "ana@club.org", "role": "admin"})),
            record(json!({"id": "u2", "email": "bo@club.org", "role": "user"})),
        ]
    }

    fn tables(view: &DashboardView) -> Vec<Table> {
        view.tabs.iter().map(|t| t.table).collect()
    }

    fn is_loading(view: &DashboardView, table: Table) -> bool {
        view.tab(table).map(|t| t.loading).unwrap_or(false)
    }

    fn row_count(view: &DashboardView, table: Table) -> Option<usize> {
        view.tab(table).map(|t| t.view.records().len())
    }

    #[test]
    fn test_tabs_follow_role() {
        assert_eq!(
            tables(&DashboardView::new(Role::User, 25)),
            vec![Table::Players, Table::Competitions, Table::Registrations]
        );
        assert!(tables(&DashboardView::new(Role::Admin, 25)).contains(&Table::Users));
    }

    #[test]
    fn test_first_fetch_only_once() {
        let mut view = DashboardView::new(Role::User, 25);
        assert_eq!(
            view.fetch_if_needed(),
            Some(DashboardAction::Fetch(Table::Players))
        );
        assert!(is_loading(&view, Table::Players));
        assert_eq!(view.fetch_if_needed(), None);

        view.set_records(Table::Players, Vec::new());
        assert!(!is_loading(&view, Table::Players));
        assert_eq!(view.fetch_if_needed(), None);
        assert_eq!(
            view.handle_input(key('r')),
            Some(DashboardAction::Fetch(Table::Players))
        );
    }

    #[test]
    fn test_tab_switch_fetches_new_tab() {
        let mut view = DashboardView::new(Role::User, 25);
        view.set_records(Table::Players, Vec::new());
        let action = view.handle_input(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(action, Some(DashboardAction::Fetch(Table::Competitions)));
        assert_eq!(view.active_table(), Some(Table::Competitions));

        let action = view.handle_input(KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE));
        assert_eq!(action, None);
        assert_eq!(view.active_table(), Some(Table::Players));
    }

    #[test]
    fn test_search_mode_captures_keys() {
        let mut view = DashboardView::new(Role::User, 25);
        view.set_records(
            Table::Players,
            vec![
                record(json!({"first_name": "Ana"})),
                record(json!({"first_name": "Bo"})),
            ],
        );
        view.handle_input(key('/'));
        assert!(view.is_searching());
        // 'q' is text while searching, not quit.
        assert_eq!(view.handle_input(key('q')), None);
        view.handle_input(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        view.handle_input(key('b'));
        assert_eq!(view.active_view().map(|v| v.visible().len()), Some(1));
    }

    #[test]
    fn test_admin_role_toggle() {
        let mut view = DashboardView::new(Role::Admin, 25);
        view.set_records(Table::Users, users());
        while view.active_table() != Some(Table::Users) {
            view.handle_input(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        }
        assert_eq!(
            view.handle_input(key('t')),
            Some(DashboardAction::ChangeRole {
                user_id: "u1".to_string(),
                role: Role::User,
            })
        );
        view.handle_input(key('j'));
        assert_eq!(
            view.handle_input(key('t')),
            Some(DashboardAction::ChangeRole {
                user_id: "u2".to_string(),
                role: Role::Admin,
            })
        );
    }

    #[test]
    fn test_delete_requires_admin() {
        let mut user_view = DashboardView::new(Role::User, 25);
        user_view.set_records(Table::Players, vec![record(json!({"id": 7}))]);
        assert_eq!(user_view.handle_input(key('d')), None);

        let mut admin_view = DashboardView::new(Role::Admin, 25);
        admin_view.set_records(Table::Players, vec![record(json!({"id": 7}))]);
        assert_eq!(
            admin_view.handle_input(key('d')),
            Some(DashboardAction::ConfirmDelete {
                table: Table::Players,
                id: "7".to_string(),
            })
        );
    }

    #[test]
    fn test_replace_and_remove_rows() {
        let mut view = DashboardView::new(Role::Admin, 25);
        view.set_records(Table::Users, users());

        view.replace_row(
            Table::Users,
            record(json!({"id": "u2", "email": "bo@club.org", "role": "admin"})),
        );
        let roles: Vec<String> = view
            .tab(Table::Users)
            .map(|t| t.view.records().iter().map(|r| value_text(&r["role"])).collect())
            .unwrap_or_default();
        assert_eq!(roles, vec!["admin", "admin"]);

        view.remove_row(Table::Users, "u1");
        assert_eq!(row_count(&view, Table::Users), Some(1));
    }

    #[test]
    fn test_form_shortcuts() {
        let mut view = DashboardView::new(Role::User, 25);
        assert_eq!(
            view.handle_input(key('a')),
            Some(DashboardAction::OpenForm(FormKind::Registration))
        );
        assert_eq!(
            view.handle_input(key('e')),
            Some(DashboardAction::OpenForm(FormKind::Profile))
        );
    }

    #[test]
    fn test_failed_fetch_is_not_an_empty_table() {
        let mut view = DashboardView::new(Role::User, 25);
        view.fetch_if_needed();
        view.fetch_failed(Table::Players);
        assert!(!is_loading(&view, Table::Players));
        assert_eq!(
            view.failure_message(Table::Players).as_deref(),
            Some("Failed to load players")
        );

        // Refreshing clears the failure while the new request runs.
        assert_eq!(
            view.handle_input(key('r')),
            Some(DashboardAction::Fetch(Table::Players))
        );
        assert_eq!(view.failure_message(Table::Players), None);

        view.fetch_failed(Table::Players);
        view.set_records(Table::Players, vec![record(json!({"first_name": "Ana"}))]);
        assert_eq!(view.failure_message(Table::Players), None);
        assert_eq!(view.failure_message(Table::Competitions), None);
    }
}
