//! Sign-in screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::components::{centered_rect, TextInput};

/// Actions returned from the sign-in screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInAction {
    Submit { email: String, password: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Email,
    Password,
}

/// Email and password prompt.
#[derive(Debug)]
pub struct SignInView {
    backend_name: String,
    email: TextInput,
    password: TextInput,
    focus: Focus,
    submitting: bool,
    error: Option<String>,
}

impl SignInView {
    /// Create the prompt, prefilling the email when one is configured.
    pub fn new(backend_name: impl Into<String>, email: Option<&str>) -> Self {
        let email_input = match email {
            Some(email) => TextInput::with_value(email),
            None => TextInput::new().with_placeholder("you@club.org"),
        };
        let focus = if email.is_some() {
            Focus::Password
        } else {
            Focus::Email
        };
        Self {
            backend_name: backend_name.into(),
            email: email_input,
            password: TextInput::masked(),
            focus,
            submitting: false,
            error: None,
        }
    }

    /// Show a failed attempt and allow another one.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.submitting = false;
        self.password.clear();
        self.focus = Focus::Password;
    }

    /// Back to a blank password after a sign-out or expiry.
    pub fn reset(&mut self) {
        self.submitting = false;
        self.password.clear();
        self.focus = if self.email.is_empty() {
            Focus::Email
        } else {
            Focus::Password
        };
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<SignInAction> {
        if self.submitting {
            return None;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) | (KeyCode::Down, _) | (KeyCode::Up, _) => {
                self.focus = match self.focus {
                    Focus::Email => Focus::Password,
                    Focus::Password => Focus::Email,
                };
                None
            }
            (KeyCode::Enter, KeyModifiers::NONE) => {
                if self.focus == Focus::Email && self.password.is_empty() {
                    self.focus = Focus::Password;
                    return None;
                }
                self.submitting = true;
                self.error = None;
                Some(SignInAction::Submit {
                    email: self.email.value().trim().to_string(),
                    password: self.password.value().to_string(),
                })
            }
            _ => {
                match self.focus {
                    Focus::Email => self.email.handle_input(key),
                    Focus::Password => self.password.handle_input(key),
                };
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(56, 14, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(format!(" Sign in · {} ", self.backend_name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        self.email
            .render_with_label(frame, chunks[0], "Email", self.focus == Focus::Email);
        self.password
            .render_with_label(frame, chunks[1], "Password", self.focus == Focus::Password);

        let status = if self.submitting {
            Line::styled("Signing in...", Style::default().fg(Color::Yellow))
        } else if let Some(error) = &self.error {
            Line::styled(
                error.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else {
            Line::raw("")
        };
        frame.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), chunks[2]);
    }
}
