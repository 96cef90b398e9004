//! Clients for the hosted backend.
//!
//! This module provides the interface for the remote relational data API
//! (generic table CRUD and stored procedures) and the identity API
//! (sign-in, sessions, user metadata).

pub mod auth;
mod client;
pub mod error;
pub mod types;

pub use auth::{authorize, IdentityClient, Session};
pub use client::{DataClient, DEFAULT_TIMEOUT_SECS};
pub use types::Table;
