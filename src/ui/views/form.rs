//! Form modal.
//!
//! One labeled input per form field. Submitting validates locally first; a
//! failed check focuses the offending field and no request is made.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::api::types::Record;
use crate::form::{FieldKind, Form, FormKind};
use crate::ui::components::{centered_rect, TextInput};

/// Actions returned from the form modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// The form passed local validation and should be sent.
    Submit(Form),
    Cancel,
}

/// The form modal.
#[derive(Debug)]
pub struct FormView {
    form: Form,
    inputs: Vec<TextInput>,
    focus: usize,
    submitting: bool,
    error: Option<String>,
    /// Confirmation of the last successful submit.
    notice: Option<String>,
}

fn build_inputs(form: &Form) -> Vec<TextInput> {
    form.fields()
        .iter()
        .map(|field| {
            let input = TextInput::with_value(field.value.as_str());
            match field.kind {
                FieldKind::Date => input.with_placeholder("YYYY-MM-DD"),
                FieldKind::Phone => input.with_placeholder("+386 40 123 456"),
                _ => input,
            }
        })
        .collect()
}

impl FormView {
    pub fn new(form: Form) -> Self {
        Self {
            inputs: build_inputs(&form),
            form,
            focus: 0,
            submitting: false,
            error: None,
            notice: None,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.form.kind()
    }

    /// Show a submit failure; the entered values stay.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.notice = None;
        self.submitting = false;
    }

    /// After a successful submit: clear the fields, then fill them from
    /// `values` (empty for a fresh row) and show `notice`.
    pub fn reset(&mut self, values: &Record, notice: impl Into<String>) {
        self.form.reset();
        self.form.fill(values);
        self.inputs = build_inputs(&self.form);
        self.focus = 0;
        self.submitting = false;
        self.error = None;
        self.notice = Some(notice.into());
    }

    fn sync(&mut self) {
        for (index, input) in self.inputs.iter().enumerate() {
            self.form.set_at(index, input.value());
        }
    }

    fn try_submit(&mut self) -> Option<FormAction> {
        self.sync();
        if let Err(e) = self.form.validate() {
            if let Some(index) = self.form.fields().iter().position(|f| f.key == e.field) {
                self.focus = index;
            }
            self.error = Some(e.message);
            self.notice = None;
            return None;
        }
        self.error = None;
        self.notice = None;
        self.submitting = true;
        Some(FormAction::Submit(self.form.clone()))
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<FormAction> {
        if self.submitting {
            return None;
        }
        let last = self.inputs.len().saturating_sub(1);
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => Some(FormAction::Cancel),
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => self.try_submit(),
            (KeyCode::Enter, _) if self.focus == last => self.try_submit(),
            (KeyCode::Tab, _) | (KeyCode::Down, _) | (KeyCode::Enter, _) => {
                self.focus = if self.focus >= last { 0 } else { self.focus + 1 };
                None
            }
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
                self.focus = if self.focus == 0 { last } else { self.focus - 1 };
                None
            }
            _ => {
                if let Some(input) = self.inputs.get_mut(self.focus) {
                    input.handle_input(key);
                }
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let height = (self.inputs.len() as u16) * 3 + 6;
        let popup = centered_rect(64, height, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(format!(" {} ", self.form.kind().title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let mut constraints: Vec<Constraint> =
            self.inputs.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Min(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(constraints)
            .split(inner);

        for (index, (field, input)) in self.form.fields().iter().zip(&self.inputs).enumerate() {
            let label = if field.required {
                format!("{} *", field.label)
            } else {
                field.label.to_string()
            };
            input.render_with_label(frame, chunks[index], &label, index == self.focus);
        }

        let status = if self.submitting {
            Line::styled("Submitting...", Style::default().fg(Color::Yellow))
        } else if let Some(error) = &self.error {
            Line::styled(
                error.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else if let Some(notice) = &self.notice {
            Line::styled(notice.as_str(), Style::default().fg(Color::Green))
        } else {
            Line::styled("* required", Style::default().fg(Color::DarkGray))
        };
        if let Some(area) = chunks.last() {
            frame.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), *area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(view: &mut FormView, text: &str) {
        for c in text.chars() {
            view.handle_input(key(KeyCode::Char(c)));
        }
    }

    fn ctrl_s() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_missing_required_field_focuses_it() {
        let mut view = FormView::new(Form::new(FormKind::Profile));
        assert_eq!(view.handle_input(ctrl_s()), None);
        assert_eq!(view.focus, 0);
        assert_eq!(view.error.as_deref(), Some("Full name is required"));
        assert!(!view.submitting);
    }

    #[test]
    fn test_short_phone_blocks_submit() {
        let mut view = FormView::new(Form::new(FormKind::Profile));
        type_str(&mut view, "Ana Novak");
        view.handle_input(key(KeyCode::Tab));
        type_str(&mut view, "12345");
        assert_eq!(view.handle_input(ctrl_s()), None);
        assert_eq!(view.focus, 1);
        assert!(view.error.as_deref().unwrap_or_default().contains("7 to 15 digits"));
    }

    #[test]
    fn test_valid_form_submits_values() {
        let mut view = FormView::new(Form::new(FormKind::Profile));
        type_str(&mut view, "Ana Novak");
        view.handle_input(key(KeyCode::Tab));
        type_str(&mut view, "+386 40 123 456");
        match view.handle_input(key(KeyCode::Enter)) {
            Some(FormAction::Submit(form)) => {
                assert_eq!(form.value("full_name"), Some("Ana Novak"));
                assert_eq!(form.value("phone"), Some("+386 40 123 456"));
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert!(view.submitting);
        assert_eq!(view.handle_input(key(KeyCode::Esc)), None);
    }

    #[test]
    fn test_set_error_keeps_values() {
        let mut view = FormView::new(Form::new(FormKind::Profile));
        type_str(&mut view, "Ana");
        view.handle_input(ctrl_s());
        view.set_error("Server error: db down");
        assert!(!view.submitting);
        assert_eq!(view.inputs[0].value(), "Ana");
    }

    #[test]
    fn test_tab_wraps_and_escape_cancels() {
        let mut view = FormView::new(Form::new(FormKind::Profile));
        view.handle_input(key(KeyCode::BackTab));
        assert_eq!(view.focus, 1);
        view.handle_input(key(KeyCode::Tab));
        assert_eq!(view.focus, 0);
        assert_eq!(view.handle_input(key(KeyCode::Esc)), Some(FormAction::Cancel));
    }

    #[test]
    fn test_reset_clears_fields_and_accepts_input_again() {
        let mut view = FormView::new(Form::new(FormKind::Profile));
        type_str(&mut view, "Ana Novak");
        view.handle_input(key(KeyCode::Tab));
        type_str(&mut view, "+386 40 123 456");
        assert!(view.handle_input(ctrl_s()).is_some());

        view.reset(&Record::new(), "Profile updated");
        assert!(!view.submitting);
        assert_eq!(view.focus, 0);
        assert!(view.inputs.iter().all(|input| input.value().is_empty()));
        assert_eq!(view.notice.as_deref(), Some("Profile updated"));

        type_str(&mut view, "Bo");
        assert_eq!(view.inputs[0].value(), "Bo");
    }

    #[test]
    fn test_reset_refills_from_values() {
        let mut view = FormView::new(Form::new(FormKind::Profile));
        let values = serde_json::json!({"full_name": "Ana Kovač"});
        view.reset(values.as_object().unwrap(), "Profile updated");
        assert_eq!(view.inputs[0].value(), "Ana Kovač");
        assert_eq!(view.inputs[1].value(), "");
    }
}
