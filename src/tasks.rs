//! Async task management for non-blocking API operations.
//!
//! This module provides a way to execute backend calls in background tasks
//! while keeping the UI responsive. Results travel back to the main event
//! loop over a tokio channel.
//!
//! # Architecture
//!
//! 1. A user action needs the network (sign in, load a table, submit a form)
//! 2. The app spawns a background task via `TaskSpawner`
//! 3. The main loop keeps rendering and handling events
//! 4. When the task completes, it sends one `ApiMessage` through the channel
//! 5. The main loop polls the channel with `try_recv()` and applies the result
//!
//! Tasks are never retried or cancelled.

use tokio::sync::mpsc;
use tracing::warn;

use crate::api::auth::{delete_refresh_token, get_refresh_token, store_refresh_token};
use crate::api::error::ApiError;
use crate::api::types::{Record, Role};
use crate::api::{DataClient, IdentityClient, Session, Table};
use crate::error::AppError;
use crate::form::{self, Form, FormKind, Submitted};

/// Messages sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum ApiMessage {
    /// Password sign-in finished.
    SignedIn(Result<Session, ApiError>),

    /// A session was resumed from the keyring or refreshed before expiry.
    SessionRestored(Result<Session, ApiError>),

    /// Rows for a dashboard table.
    RecordsFetched {
        table: Table,
        result: Result<Vec<Record>, ApiError>,
    },

    /// A form was submitted (or rejected locally).
    FormSubmitted {
        kind: FormKind,
        result: Result<Submitted, AppError>,
    },

    /// A user's role was changed.
    RoleChanged {
        user_id: String,
        result: Result<Record, ApiError>,
    },

    /// A row was deleted.
    RowDeleted {
        table: Table,
        id: String,
        result: Result<(), ApiError>,
    },

    /// Sign-out finished. The local session is gone either way.
    SignedOut,
}

/// Spawns background tasks for async operations.
///
/// Each method clones the necessary data and spawns a tokio task that sends
/// its result through the channel.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Spawn a password sign-in. On success the refresh token is stored in
    /// the keyring under `backend_name`.
    pub fn spawn_sign_in(
        &self,
        identity: &IdentityClient,
        backend_name: String,
        email: String,
        password: String,
    ) {
        let tx = self.tx.clone();
        let identity = identity.clone();
        tokio::spawn(async move {
            let result = identity.sign_in(&email, &password).await;
            if let Ok(session) = &result {
                remember_session(&backend_name, session);
            }
            let _ = tx.send(ApiMessage::SignedIn(result));
        });
    }

    /// Spawn a session restore from the keyring. The user is re-read from
    /// the identity service before the session is handed back.
    pub fn spawn_restore_session(&self, identity: &IdentityClient, backend_name: String) {
        let tx = self.tx.clone();
        let identity = identity.clone();
        tokio::spawn(async move {
            let result = async {
                let token = get_refresh_token(&backend_name)?;
                identity.resume(&token).await
            }
            .await;
            if let Ok(session) = &result {
                remember_session(&backend_name, session);
            }
            let _ = tx.send(ApiMessage::SessionRestored(result));
        });
    }

    /// Spawn a refresh of a live session whose access token is expiring.
    pub fn spawn_refresh(&self, identity: &IdentityClient, backend_name: String, refresh_token: String) {
        let tx = self.tx.clone();
        let identity = identity.clone();
        tokio::spawn(async move {
            let result = identity.refresh(&refresh_token).await;
            if let Ok(session) = &result {
                remember_session(&backend_name, session);
            }
            let _ = tx.send(ApiMessage::SessionRestored(result));
        });
    }

    /// Spawn a full-table fetch.
    pub fn spawn_fetch(&self, data: &DataClient, session: &Session, table: Table) {
        let tx = self.tx.clone();
        let client = with_token(data, session);
        tokio::spawn(async move {
            let result = client.fetch(table).await;
            let _ = tx.send(ApiMessage::RecordsFetched { table, result });
        });
    }

    /// Spawn a form submit.
    pub fn spawn_submit(
        &self,
        form: Form,
        data: &DataClient,
        identity: &IdentityClient,
        session: Option<Session>,
    ) {
        let tx = self.tx.clone();
        let data = data.clone();
        let identity = identity.clone();
        tokio::spawn(async move {
            let result = form::submit(&form, &data, &identity, session.as_ref()).await;
            let _ = tx.send(ApiMessage::FormSubmitted {
                kind: form.kind(),
                result,
            });
        });
    }

    /// Spawn a role change on a user profile row.
    ///
    /// Only the `profiles` row is written. Sessions read the role from the
    /// identity user's metadata, which the backend copies from `profiles`;
    /// the changed user sees the new role on their next sign-in or resume.
    pub fn spawn_change_role(
        &self,
        data: &DataClient,
        session: &Session,
        user_id: String,
        role: Role,
    ) {
        let tx = self.tx.clone();
        let client = with_token(data, session);
        tokio::spawn(async move {
            let table = Table::Users;
            let result = client
                .update(table.name(), table.id_column(), &user_id, &role_patch(role))
                .await;
            let _ = tx.send(ApiMessage::RoleChanged { user_id, result });
        });
    }

    /// Spawn a row delete.
    pub fn spawn_delete(&self, data: &DataClient, session: &Session, table: Table, id: String) {
        let tx = self.tx.clone();
        let client = with_token(data, session);
        tokio::spawn(async move {
            let result = client.delete(table.name(), table.id_column(), &id).await;
            let _ = tx.send(ApiMessage::RowDeleted { table, id, result });
        });
    }

    /// Spawn a sign-out: revoke the session and forget the stored token.
    pub fn spawn_sign_out(&self, identity: &IdentityClient, session: Session, backend_name: String) {
        let tx = self.tx.clone();
        let identity = identity.clone();
        tokio::spawn(async move {
            if let Err(e) = identity.sign_out(session.access_token()).await {
                warn!("Sign-out request failed: {}", e);
            }
            if let Err(e) = delete_refresh_token(&backend_name) {
                warn!("Could not remove stored token: {}", e);
            }
            let _ = tx.send(ApiMessage::SignedOut);
        });
    }
}

/// Body of the `profiles` update for a role change.
fn role_patch(role: Role) -> Record {
    let mut patch = Record::new();
    patch.insert("role".to_string(), role.as_str().into());
    patch
}

fn with_token(data: &DataClient, session: &Session) -> DataClient {
    let mut client = data.clone();
    client.set_access_token(Some(session.access_token().to_string()));
    client
}

fn remember_session(backend_name: &str, session: &Session) {
    if let Err(e) = store_refresh_token(backend_name, session.refresh_token()) {
        warn!("Could not store refresh token: {}", e);
    }
}

/// Create a new task channel and spawner.
///
/// Returns a tuple of (receiver, spawner). The receiver should be polled
/// in the main event loop, and the spawner should be used to spawn tasks.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}
