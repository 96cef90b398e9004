//! Application state and update logic.
//!
//! Follows The Elm Architecture: `update` consumes terminal events,
//! `handle_api_message` consumes finished background tasks, and `view`
//! renders. Anything that needs the network is queued as a [`Command`] and
//! dispatched by the main loop, so state changes stay synchronous and
//! testable.

use tracing::{debug, info, trace, warn};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::error::ApiError;
use crate::api::types::{Record, Role, Table};
use crate::api::Session;
use crate::config::{Backend, Settings};
use crate::content::ContentEntry;
use crate::error::AppError;
use crate::events::{Event, KeyContext};
use crate::form::{Form, FormKind, FormOutcome, Submitted, Target};
use crate::tasks::ApiMessage;
use crate::ui::{
    render_context_help, ConfirmAction, ConfirmDialog, ContentAction, ContentView,
    DashboardAction, DashboardView, ErrorDialog, FormAction, FormView, HelpAction, HelpView,
    NotificationManager, SignInAction, SignInView, Theme,
};

/// The screen being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    SignIn,
    Dashboard,
    Content,
    Help,
}

/// Side effects requested by the app, run by the main loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SignIn { email: String, password: String },
    RestoreSession,
    Refresh { refresh_token: String },
    Fetch { table: Table, session: Session },
    Submit { form: Form, session: Option<Session> },
    ChangeRole { user_id: String, role: Role, session: Session },
    Delete { table: Table, id: String, session: Session },
    SignOut { session: Session },
    LoadContent,
    OpenUrl(String),
}

/// The main application state.
pub struct App {
    screen: Screen,
    /// Where Help returns to.
    previous: Screen,
    should_quit: bool,
    settings: Settings,
    backend_name: String,
    theme: Theme,
    session: Option<Session>,
    refreshing: bool,
    sign_in: SignInView,
    dashboard: Option<DashboardView>,
    form: Option<FormView>,
    content: Option<ContentView>,
    help: HelpView,
    confirm: ConfirmDialog,
    pending_delete: Option<(Table, String)>,
    notifications: NotificationManager,
    error_dialog: ErrorDialog,
    commands: Vec<Command>,
}

impl App {
    /// Create the app for `backend`. A stored session is restored first.
    pub fn new(settings: Settings, backend: &Backend) -> Self {
        debug!(backend = %backend.name, "Creating application");
        Self {
            screen: Screen::SignIn,
            previous: Screen::SignIn,
            should_quit: false,
            theme: Theme::from_name(&settings.theme),
            settings,
            backend_name: backend.name.clone(),
            session: None,
            refreshing: false,
            sign_in: SignInView::new(backend.name.as_str(), backend.email.as_deref()),
            dashboard: None,
            form: None,
            content: None,
            help: HelpView::new(),
            confirm: ConfirmDialog::new(),
            pending_delete: None,
            notifications: NotificationManager::new(),
            error_dialog: ErrorDialog::new(),
            commands: vec![Command::RestoreSession],
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Drain the queued side effects.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Report an error: critical ones block in a dialog, others are toasts.
    /// A 401 ends the session and returns to the sign-in screen.
    pub fn handle_error(&mut self, error: &AppError) {
        if error.requires_sign_in() {
            info!("Session rejected, returning to sign-in");
            self.end_session();
            self.sign_in
                .set_error("Your session has expired. Please sign in again.");
            return;
        }
        if error.is_critical() {
            warn!(error = %error, "Critical error occurred");
            self.error_dialog.show(error);
        } else {
            debug!(error = %error, status = error.status_code(), "Recoverable error occurred");
            self.notifications.error(error.user_message());
        }
    }

    fn end_session(&mut self) {
        self.session = None;
        self.refreshing = false;
        self.dashboard = None;
        self.form = None;
        self.content = None;
        self.pending_delete = None;
        self.screen = Screen::SignIn;
        self.sign_in.reset();
    }

    fn start_session(&mut self, session: Session) {
        let role = session.role();
        info!(role = %role, "Session started");
        let mut dashboard = DashboardView::new(role, self.settings.page_size);
        let fetch = dashboard.fetch_if_needed();
        self.notifications
            .success(format!("Signed in as {}", session.user().display_name()));
        self.session = Some(session);
        self.dashboard = Some(dashboard);
        self.screen = Screen::Dashboard;
        if let Some(action) = fetch {
            self.apply_dashboard_action(action);
        }
    }

    /// Apply one event.
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                trace!(key = ?key.code, modifiers = ?key.modifiers, "Key event");
                self.handle_key_event(key);
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
            }
            Event::Tick => self.handle_tick(),
        }
    }

    fn handle_tick(&mut self) {
        self.notifications.tick();

        // Refresh shortly before the access token expires.
        if let Some(session) = &self.session {
            if session.is_expired() && !self.refreshing {
                debug!("Access token expiring, refreshing");
                self.refreshing = true;
                self.commands.push(Command::Refresh {
                    refresh_token: session.refresh_token().to_string(),
                });
            }
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return;
        }

        if self.error_dialog.is_visible() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_dialog.dismiss();
            }
            return;
        }

        if self.confirm.is_visible() {
            if let Some(action) = self.confirm.handle_input(key) {
                let pending = self.pending_delete.take();
                if let (ConfirmAction::Confirm, Some((table, id))) = (action, pending) {
                    if let Some(session) = self.session.clone() {
                        info!(table = %table, id = %id, "Deleting row");
                        self.commands.push(Command::Delete { table, id, session });
                    }
                }
            }
            return;
        }

        if let Some(form) = self.form.as_mut() {
            match form.handle_input(key) {
                Some(FormAction::Submit(form)) => {
                    debug!(kind = ?form.kind(), "Submitting form");
                    self.commands.push(Command::Submit {
                        form,
                        session: self.session.clone(),
                    });
                }
                Some(FormAction::Cancel) => self.form = None,
                None => {}
            }
            return;
        }

        match self.screen {
            Screen::SignIn => {
                if let Some(SignInAction::Submit { email, password }) =
                    self.sign_in.handle_input(key)
                {
                    self.commands.push(Command::SignIn { email, password });
                }
            }
            Screen::Dashboard => {
                let action = self
                    .dashboard
                    .as_mut()
                    .and_then(|dashboard| dashboard.handle_input(key));
                if let Some(action) = action {
                    self.apply_dashboard_action(action);
                }
            }
            Screen::Content => {
                let action = self
                    .content
                    .as_mut()
                    .and_then(|content| content.handle_input(key));
                match action {
                    Some(ContentAction::Open(url)) => self.commands.push(Command::OpenUrl(url)),
                    Some(ContentAction::Close) => self.screen = Screen::Dashboard,
                    None => {}
                }
            }
            Screen::Help => {
                if let Some(HelpAction::Close) = self.help.handle_input(key) {
                    self.screen = self.previous;
                }
            }
        }
    }

    fn apply_dashboard_action(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::Fetch(table) => match self.session.clone() {
                Some(session) => self.commands.push(Command::Fetch { table, session }),
                None => self.handle_error(&ApiError::Unauthorized.into()),
            },
            DashboardAction::OpenForm(kind) => self.open_form(kind),
            DashboardAction::OpenContent => {
                self.commands.push(Command::LoadContent);
            }
            DashboardAction::ChangeRole { user_id, role } => {
                if let Some(session) = self.session.clone() {
                    self.commands.push(Command::ChangeRole {
                        user_id,
                        role,
                        session,
                    });
                }
            }
            DashboardAction::ConfirmDelete { table, id } => {
                self.confirm.show(
                    "Delete",
                    format!("Delete {} row {}? This cannot be undone.", table.title(), id),
                );
                self.pending_delete = Some((table, id));
            }
            DashboardAction::SignOut => {
                if let Some(session) = self.session.clone() {
                    self.commands.push(Command::SignOut { session });
                }
                self.end_session();
                self.notifications.info("Signed out");
            }
            DashboardAction::Help => {
                self.previous = self.screen;
                self.screen = Screen::Help;
            }
            DashboardAction::Quit => self.should_quit = true,
        }
    }

    fn open_form(&mut self, kind: FormKind) {
        let role = self.session.as_ref().map(Session::role).unwrap_or_default();
        if !role.satisfies(kind.required_role()) {
            self.handle_error(&ApiError::Forbidden.into());
            return;
        }
        let mut form = Form::new(kind);
        if kind == FormKind::Profile {
            if let Some(session) = &self.session {
                form.fill(&session.user().user_metadata);
            }
        }
        self.form = Some(FormView::new(form));
    }

    /// Show loaded content entries.
    pub fn show_content(&mut self, entries: Vec<ContentEntry>) {
        debug!(count = entries.len(), "Showing content browser");
        if entries.is_empty() {
            self.notifications.warning("No content found");
        }
        self.content = Some(ContentView::new(
            entries,
            self.settings.site_url.as_str(),
            self.settings.page_size,
        ));
        self.screen = Screen::Content;
    }

    /// Apply a finished background task.
    pub fn handle_api_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::SignedIn(Ok(session)) => self.start_session(session),
            ApiMessage::SignedIn(Err(e)) => {
                debug!(error = %e, "Sign-in failed");
                self.sign_in.set_error(AppError::from(e).user_message());
            }
            ApiMessage::SessionRestored(Ok(session)) => {
                if self.refreshing && self.session.is_some() {
                    debug!("Session refreshed");
                    self.refreshing = false;
                    self.session = Some(session);
                } else if self.session.is_none() && self.screen == Screen::SignIn {
                    self.start_session(session);
                }
            }
            ApiMessage::SessionRestored(Err(e)) => {
                if self.refreshing {
                    self.handle_error(&AppError::from(e));
                } else {
                    debug!(error = %e, "No session to restore");
                }
            }
            ApiMessage::RecordsFetched { table, result } => match result {
                Ok(records) => {
                    debug!(table = %table, count = records.len(), "Records fetched");
                    if let Some(dashboard) = self.dashboard.as_mut() {
                        dashboard.set_records(table, records);
                    }
                }
                Err(e) => {
                    if let Some(dashboard) = self.dashboard.as_mut() {
                        dashboard.fetch_failed(table);
                    }
                    self.handle_error(&AppError::from(e));
                }
            },
            ApiMessage::FormSubmitted { kind, result } => self.handle_submitted(kind, result),
            ApiMessage::RoleChanged { user_id, result } => match result {
                Ok(record) => {
                    if let Some(dashboard) = self.dashboard.as_mut() {
                        dashboard.replace_row(Table::Users, record);
                    }
                    self.notifications.success(format!("Role updated for {}", user_id));
                }
                Err(e) => self.handle_error(&AppError::from(e)),
            },
            ApiMessage::RowDeleted { table, id, result } => match result {
                Ok(()) => {
                    if let Some(dashboard) = self.dashboard.as_mut() {
                        dashboard.remove_row(table, &id);
                    }
                    self.notifications.success(format!("Deleted {} row {}", table.title(), id));
                }
                Err(e) => self.handle_error(&AppError::from(e)),
            },
            ApiMessage::SignedOut => debug!("Sign-out finished"),
        }
    }

    fn handle_submitted(&mut self, kind: FormKind, result: Result<Submitted, AppError>) {
        let outcome = FormOutcome::from_result(kind, &result);
        match result {
            Ok(submitted) => {
                info!(kind = ?kind, "Form submitted");
                self.notifications.push((&outcome).into());
                // The form stays open, emptied for the next entry. A profile
                // is refilled with what the server now holds.
                let refill = match (submitted, kind.target()) {
                    (Submitted::User(user), _) => {
                        let metadata = user.user_metadata.clone();
                        if let Some(session) = self.session.as_mut() {
                            session.set_user(user);
                        }
                        metadata
                    }
                    (Submitted::Row(_), Target::Table(table)) => {
                        let action = self
                            .dashboard
                            .as_mut()
                            .and_then(|dashboard| dashboard.begin_fetch(table));
                        if let Some(action) = action {
                            self.apply_dashboard_action(action);
                        }
                        Record::new()
                    }
                    (Submitted::Row(_), Target::UserMetadata) => Record::new(),
                };
                if let Some(form) = self.open_form_of(kind) {
                    form.reset(&refill, outcome.message());
                }
            }
            Err(e) if e.requires_sign_in() => self.handle_error(&e),
            Err(_) => {
                if let Some(form) = self.open_form_of(kind) {
                    form.set_error(outcome.message());
                }
                self.notifications.push((&outcome).into());
            }
        }
    }

    /// The open form, if it is of `kind`.
    fn open_form_of(&mut self, kind: FormKind) -> Option<&mut FormView> {
        self.form.as_mut().filter(|form| form.kind() == kind)
    }

    fn key_context(&self) -> KeyContext {
        if self.form.is_some() {
            return KeyContext::Form;
        }
        match self.screen {
            Screen::SignIn => KeyContext::SignIn,
            Screen::Dashboard => match &self.dashboard {
                Some(dashboard) if dashboard.is_searching() => KeyContext::Search,
                _ => KeyContext::Dashboard,
            },
            Screen::Content => KeyContext::Content,
            Screen::Help => KeyContext::Help,
        }
    }

    /// Render the UI.
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);

        match self.screen {
            Screen::SignIn => self.sign_in.render(frame, chunks[1]),
            Screen::Dashboard => {
                if let Some(dashboard) = &self.dashboard {
                    dashboard.render(frame, chunks[1]);
                }
            }
            Screen::Content => {
                if let Some(content) = &self.content {
                    content.render(frame, chunks[1]);
                }
            }
            Screen::Help => self.help.render(frame, chunks[1]),
        }

        let status = self.session.as_ref().map(|s| s.role().as_str());
        render_context_help(frame, chunks[2], self.key_context(), status);

        if let Some(form) = &self.form {
            form.render(frame, area);
        }
        self.confirm.render(frame, area);
        self.notifications.render(frame, area);
        self.error_dialog.render(frame, area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled("fedportal", self.theme.title())];
        spans.push(Span::styled(format!("  {}", self.backend_name), self.theme.dim()));
        if let Some(session) = &self.session {
            spans.push(Span::styled(
                format!("  {}", session.user().display_name()),
                self.theme.text(),
            ));
        }
        let header = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(self.theme.muted)),
            );
        frame.render_widget(header, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{AuthUser, TokenResponse};
    use crate::content::ContentError;
    use crate::form::ValidationError;
    use serde_json::{json, Map};

    fn backend() -> Backend {
        let mut backend = Backend::new(
            "test".to_string(),
            "https://abcd.supabase.co".to_string(),
            "anon".to_string(),
        );
        backend.email = Some("ana@club.org".to_string());
        backend
    }

    fn session(role: &str) -> Session {
        let mut metadata = Map::new();
        metadata.insert("role".to_string(), json!(role));
        metadata.insert("full_name".to_string(), json!("Ana Novak"));
        Session::from_token_response(TokenResponse {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: Some(3600),
            expires_at: None,
            user: AuthUser {
                id: "u1".to_string(),
                email: Some("ana@club.org".to_string()),
                user_metadata: metadata,
            },
        })
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn code(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn signed_in(role: &str) -> App {
        let mut app = App::new(Settings::default(), &backend());
        app.take_commands();
        app.handle_api_message(ApiMessage::SignedIn(Ok(session(role))));
        app.take_commands();
        app
    }

    #[test]
    fn test_new_app_restores_session() {
        let mut app = App::new(Settings::default(), &backend());
        assert_eq!(app.screen, Screen::SignIn);
        assert_eq!(app.take_commands(), vec![Command::RestoreSession]);
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn test_sign_in_flow() {
        let mut app = App::new(Settings::default(), &backend());
        app.take_commands();
        app.update(key('p'));
        app.update(key('w'));
        app.update(code(KeyCode::Enter));
        assert_eq!(
            app.take_commands(),
            vec![Command::SignIn {
                email: "ana@club.org".to_string(),
                password: "pw".to_string(),
            }]
        );

        app.handle_api_message(ApiMessage::SignedIn(Ok(session("user"))));
        assert_eq!(app.screen, Screen::Dashboard);
        let commands = app.take_commands();
        assert!(matches!(
            commands.as_slice(),
            [Command::Fetch { table: Table::Players, .. }]
        ));
    }

    #[test]
    fn test_failed_sign_in_stays_on_sign_in() {
        let mut app = App::new(Settings::default(), &backend());
        app.handle_api_message(ApiMessage::SignedIn(Err(ApiError::InvalidCredentials(
            "Invalid login credentials".to_string(),
        ))));
        assert_eq!(app.screen, Screen::SignIn);
        assert!(app.session.is_none());
        // Reported inline on the sign-in screen, not as a toast.
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_restore_failure_is_silent() {
        let mut app = App::new(Settings::default(), &backend());
        app.handle_api_message(ApiMessage::SessionRestored(Err(ApiError::Keyring(
            "no entry".to_string(),
        ))));
        assert_eq!(app.screen, Screen::SignIn);
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_unauthorized_fetch_redirects_to_sign_in() {
        let mut app = signed_in("user");
        app.handle_api_message(ApiMessage::RecordsFetched {
            table: Table::Players,
            result: Err(ApiError::Unauthorized),
        });
        assert_eq!(app.screen, Screen::SignIn);
        assert!(app.session.is_none());
        assert!(app.dashboard.is_none());
    }

    #[test]
    fn test_server_error_is_a_toast() {
        let mut app = signed_in("user");
        app.handle_api_message(ApiMessage::RecordsFetched {
            table: Table::Players,
            result: Err(ApiError::ServerError("db down".to_string())),
        });
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(app
            .notifications
            .iter()
            .any(|n| n.message.contains("db down")));
        assert_eq!(
            app.dashboard
                .as_ref()
                .and_then(|d| d.failure_message(Table::Players))
                .as_deref(),
            Some("Failed to load players")
        );
    }

    #[test]
    fn test_records_land_in_dashboard() {
        let mut app = signed_in("user");
        let record = json!({"first_name": "Ana"}).as_object().cloned().unwrap();
        app.handle_api_message(ApiMessage::RecordsFetched {
            table: Table::Players,
            result: Ok(vec![record]),
        });
        let rows = app
            .dashboard
            .as_ref()
            .and_then(|d| d.active_view())
            .map(|v| v.records().len());
        assert_eq!(rows, Some(1));
    }

    #[test]
    fn test_competition_form_needs_admin() {
        let mut app = signed_in("user");
        app.update(code(KeyCode::Tab));
        app.take_commands();
        app.update(key('a'));
        assert!(app.form.is_none());
        assert!(app
            .notifications
            .iter()
            .any(|n| n.message.contains("permission")));

        let mut admin = signed_in("admin");
        admin.update(code(KeyCode::Tab));
        admin.update(key('a'));
        assert_eq!(admin.form.as_ref().map(|f| f.kind()), Some(FormKind::Competition));
    }

    #[test]
    fn test_profile_form_prefilled_and_submitted() {
        let mut app = signed_in("user");
        app.update(key('e'));
        assert_eq!(app.form.as_ref().map(|f| f.kind()), Some(FormKind::Profile));
        app.update(ctrl_s());
        match app.take_commands().as_slice() {
            [Command::Submit { form, session }] => {
                assert_eq!(form.value("full_name"), Some("Ana Novak"));
                assert!(session.is_some());
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    fn ctrl_s() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
    }

    #[test]
    fn test_submit_success_keeps_form_open_and_refetches() {
        let mut app = signed_in("user");
        app.update(key('a'));
        app.handle_api_message(ApiMessage::FormSubmitted {
            kind: FormKind::Registration,
            result: Ok(Submitted::Row(Map::new())),
        });
        assert_eq!(
            app.form.as_ref().map(|f| f.kind()),
            Some(FormKind::Registration)
        );
        assert!(app
            .notifications
            .iter()
            .any(|n| n.message == "Registration submitted"));
        assert!(matches!(
            app.take_commands().as_slice(),
            [Command::Fetch { table: Table::Registrations, .. }]
        ));
    }

    #[test]
    fn test_profile_success_refills_from_new_metadata() {
        let mut app = signed_in("user");
        app.update(key('e'));
        app.update(ctrl_s());
        app.take_commands();

        let mut metadata = Map::new();
        metadata.insert("role".to_string(), json!("user"));
        metadata.insert("full_name".to_string(), json!("Ana Kovač"));
        app.handle_api_message(ApiMessage::FormSubmitted {
            kind: FormKind::Profile,
            result: Ok(Submitted::User(AuthUser {
                id: "u1".to_string(),
                email: Some("ana@club.org".to_string()),
                user_metadata: metadata,
            })),
        });
        assert_eq!(
            app.session.as_ref().map(|s| s.user().display_name()),
            Some("Ana Kovač")
        );

        // The reset form is editable again and holds the stored name.
        app.update(ctrl_s());
        match app.take_commands().as_slice() {
            [Command::Submit { form, .. }] => {
                assert_eq!(form.value("full_name"), Some("Ana Kovač"));
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn test_submit_failure_keeps_form_open() {
        let mut app = signed_in("user");
        app.update(key('a'));
        app.handle_api_message(ApiMessage::FormSubmitted {
            kind: FormKind::Registration,
            result: Err(AppError::Validation(ValidationError {
                field: "phone".to_string(),
                message: "Phone must contain 7 to 15 digits".to_string(),
            })),
        });
        assert_eq!(
            app.form.as_ref().map(|f| f.kind()),
            Some(FormKind::Registration)
        );
        assert!(app
            .notifications
            .iter()
            .any(|n| n.message == "Phone must contain 7 to 15 digits"));
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut app = signed_in("admin");
        let record = json!({"id": 7, "first_name": "Ana"}).as_object().cloned().unwrap();
        app.handle_api_message(ApiMessage::RecordsFetched {
            table: Table::Players,
            result: Ok(vec![record]),
        });
        app.update(key('d'));
        assert!(app.take_commands().is_empty());
        app.update(key('n'));
        assert!(app.take_commands().is_empty());

        app.update(key('d'));
        app.update(key('y'));
        assert!(matches!(
            app.take_commands().as_slice(),
            [Command::Delete { table: Table::Players, id, .. }] if id == "7"
        ));

        app.handle_api_message(ApiMessage::RowDeleted {
            table: Table::Players,
            id: "7".to_string(),
            result: Ok(()),
        });
        assert_eq!(
            app.dashboard
                .as_ref()
                .and_then(|d| d.active_view())
                .map(|v| v.records().len()),
            Some(0)
        );
    }

    #[test]
    fn test_forbidden_role_change_is_reported() {
        let mut app = signed_in("admin");
        app.handle_api_message(ApiMessage::RoleChanged {
            user_id: "u2".to_string(),
            result: Err(ApiError::Forbidden),
        });
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(!app.notifications.is_empty());
    }

    #[test]
    fn test_sign_out() {
        let mut app = signed_in("user");
        app.update(key('S'));
        assert_eq!(app.screen, Screen::SignIn);
        assert!(app.session.is_none());
        assert!(matches!(
            app.take_commands().as_slice(),
            [Command::SignOut { .. }]
        ));
    }

    #[test]
    fn test_help_returns_to_previous_screen() {
        let mut app = signed_in("user");
        app.update(key('?'));
        assert_eq!(app.screen, Screen::Help);
        app.update(code(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_content_browser() {
        let mut app = signed_in("user");
        app.update(key('c'));
        assert_eq!(app.take_commands(), vec![Command::LoadContent]);
        app.show_content(Vec::new());
        assert_eq!(app.screen, Screen::Content);
        app.update(code(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = App::new(Settings::default(), &backend());
        app.update(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit());
    }

    #[test]
    fn test_critical_error_shows_dialog() {
        let mut app = App::new(Settings::default(), &backend());
        app.handle_error(&AppError::Content(ContentError::FrontMatter {
            path: "content/news/cup.md".into(),
            message: "expected a mapping".to_string(),
        }));
        assert!(app.error_dialog.is_visible());
        app.update(code(KeyCode::Enter));
        assert!(!app.error_dialog.is_visible());
    }
}
