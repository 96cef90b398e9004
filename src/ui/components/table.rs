//! Data table widget.
//!
//! Renders the current page of a [`TableView`]: a numbered header with the
//! sort arrow on the sorted column, the rows, and a footer with the page
//! label. An empty result shows the placeholder row instead.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table as RatatuiTable, TableState},
    Frame,
};

use crate::api::types::Record;
use crate::table::{value_text, TableView, EMPTY_PLACEHOLDER};

/// Longest cell text before truncation.
const MAX_CELL_WIDTH: usize = 32;

/// Header labels for the columns, with 1-based numbers for the sort keys.
pub fn header_labels(view: &TableView) -> Vec<String> {
    let sort = view.sort();
    view.columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let arrow = match sort {
                Some(key) if key.field == *column => format!(" {}", key.direction.arrow()),
                _ => String::new(),
            };
            format!("{}:{}{}", i + 1, column, arrow)
        })
        .collect()
}

/// Cell texts for `rows`, one vector per row in column order.
pub fn page_cells(columns: &[String], rows: &[&Record]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| {
                    record
                        .get(column)
                        .map(|v| truncate(&value_text(v), MAX_CELL_WIDTH))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Navigation and sorting keys shared by every table screen.
///
/// Returns true if the key was used.
pub fn handle_table_key(view: &mut TableView, key: KeyEvent) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => view.select_next(),
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => view.select_prev(),
        (KeyCode::Char('n'), KeyModifiers::NONE) | (KeyCode::Right, _) | (KeyCode::PageDown, _) => {
            view.next_page();
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) | (KeyCode::Left, _) | (KeyCode::PageUp, _) => {
            view.prev_page();
        }
        (KeyCode::Char('0'), KeyModifiers::NONE) => view.clear_sort(),
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            let index = c as usize - '1' as usize;
            view.toggle_sort_column(index);
        }
        _ => return false,
    }
    true
}

fn table_block(title: &str, footer: Option<String>, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style);
    match footer {
        Some(footer) => block.title_bottom(Line::from(footer)),
        None => block,
    }
}

/// Render a single centered line in place of the rows.
pub fn render_table_message(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    style: Style,
    focused: bool,
) {
    let paragraph = Paragraph::new(Line::from(Span::styled(message.to_string(), style)))
        .centered()
        .block(table_block(title, None, focused));
    frame.render_widget(paragraph, area);
}

/// Render the table in `area`.
pub fn render_table(frame: &mut Frame, area: Rect, view: &TableView, title: &str, focused: bool) {
    let page = view.current_page();
    let footer = format!(" {} · {} rows ", page.label, page.total);
    let block = table_block(title, Some(footer), focused);

    if page.total == 0 {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            EMPTY_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        )))
        .centered()
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let labels = header_labels(view);
    let header = Row::new(labels.iter().map(|l| Cell::from(l.as_str())))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let cells = page_cells(&view.columns(), &page.rows);
    let widths: Vec<Constraint> = (0..labels.len())
        .map(|i| {
            let widest = cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(labels[i].chars().count()))
                .max()
                .unwrap_or(1);
            Constraint::Length(widest as u16)
        })
        .collect();

    let rows = cells.into_iter().map(Row::new);

    let table = RatatuiTable::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(2)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_selected(Some(view.selected()));
    frame.render_stateful_widget(table, area, &mut state);
}
