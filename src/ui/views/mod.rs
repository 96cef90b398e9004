//! Application screens.

mod content;
mod dashboard;
mod form;
mod help;
mod sign_in;

pub use content::{ContentAction, ContentView};
pub use dashboard::{DashboardAction, DashboardView};
pub use form::{FormAction, FormView};
pub use help::{HelpAction, HelpView};
pub use sign_in::{SignInAction, SignInView};
