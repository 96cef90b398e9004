//! Reusable UI components.

mod help_bar;
mod input;
mod modal;
mod notification;
mod search_bar;
mod table;

pub use help_bar::render_context_help;
pub use input::TextInput;
pub use modal::{centered_rect, ConfirmAction, ConfirmDialog, ErrorDialog};
pub use notification::NotificationManager;
pub use search_bar::SearchBar;
pub use table::{handle_table_key, render_table, render_table_message};
