//! Terminal events and key hints.
//!
//! The event loop turns crossterm input into [`Event`]s; a `Tick` arrives
//! whenever nothing happened within the tick rate, which is when the app
//! drains finished background tasks.

mod handler;
mod keys;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;
pub use keys::{get_context_hints, KeyContext};

/// Events consumed by `App::update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}
