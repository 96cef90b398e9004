//! Modal dialogs: a yes/no confirmation and a blocking error box.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::error::AppError;

/// Action returned from the confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

/// A yes/no question shown before a destructive action.
#[derive(Debug, Default)]
pub struct ConfirmDialog {
    title: String,
    message: String,
    visible: bool,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.title = title.into();
        self.message = message.into();
        self.visible = true;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// `y`/Enter confirms, `n`/Esc/`q` cancels. Other keys are swallowed.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ConfirmAction> {
        let action = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ConfirmAction::Confirm,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                ConfirmAction::Cancel
            }
            _ => return None,
        };
        self.visible = false;
        Some(action)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }
        let lines = vec![
            Line::raw(""),
            Line::raw(self.message.as_str()),
            Line::raw(""),
            Line::from(vec![
                Span::styled("[y]", Style::default().fg(Color::Cyan)),
                Span::raw(" confirm   "),
                Span::styled("[n]", Style::default().fg(Color::Cyan)),
                Span::raw(" cancel"),
            ]),
        ];
        render_box(frame, area, &self.title, lines, Color::Yellow);
    }
}

/// A blocking error box for failures the user must acknowledge.
#[derive(Debug, Default)]
pub struct ErrorDialog {
    title: String,
    message: String,
    visible: bool,
}

impl ErrorDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, error: &AppError) {
        self.show_message(format!("Error {}", error.status_code()), error.user_message());
    }

    pub fn show_message(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.title = title.into();
        self.message = message.into();
        self.visible = true;
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }
        let lines = vec![
            Line::raw(""),
            Line::styled(self.message.as_str(), Style::default().fg(Color::White)),
            Line::raw(""),
            Line::styled("Press Enter or Esc to close", Style::default().fg(Color::DarkGray)),
        ];
        render_box(frame, area, &self.title, lines, Color::Red);
    }
}

fn render_box(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'_>>, color: Color) {
    let popup = centered_rect(60, 9, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .centered()
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

/// A `width` x `height` rect centered in `area`, clipped to it.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_confirm_dialog_actions() {
        let mut dialog = ConfirmDialog::new();
        dialog.show("Delete", "Delete row 7?");
        assert!(dialog.is_visible());
        assert_eq!(dialog.handle_input(key(KeyCode::Char('x'))), None);
        assert!(dialog.is_visible());
        assert_eq!(
            dialog.handle_input(key(KeyCode::Char('y'))),
            Some(ConfirmAction::Confirm)
        );
        assert!(!dialog.is_visible());

        dialog.show("Delete", "Delete row 7?");
        assert_eq!(dialog.handle_input(key(KeyCode::Esc)), Some(ConfirmAction::Cancel));
    }

    #[test]
    fn test_error_dialog_shows_status_and_message() {
        let mut dialog = ErrorDialog::new();
        dialog.show(&AppError::Api(ApiError::ServerError("boom".into())));
        assert!(dialog.is_visible());
        assert_eq!(dialog.title, "Error 500");
        assert!(dialog.message().contains("boom"));
        dialog.dismiss();
        assert!(!dialog.is_visible());
    }

    #[test]
    fn test_centered_rect_clips() {
        let area = Rect::new(0, 0, 40, 5);
        let rect = centered_rect(60, 9, area);
        assert_eq!(rect, Rect::new(0, 0, 40, 5));
        let rect = centered_rect(10, 2, Rect::new(0, 0, 20, 10));
        assert_eq!(rect, Rect::new(5, 4, 10, 2));
    }
}
