//! Terminal UI: reusable components and the screens built from them.

mod components;
pub mod theme;
mod views;

pub use components::{
    render_context_help, ConfirmAction, ConfirmDialog, ErrorDialog, NotificationManager,
};
pub use theme::Theme;
pub use views::{
    ContentAction, ContentView, DashboardAction, DashboardView, FormAction, FormView, HelpAction,
    HelpView, SignInAction, SignInView,
};
