//! Data API client implementation.
//!
//! This module provides the client for the hosted relational data API. It
//! exposes generic CRUD over named tables plus stored procedure calls, and
//! maps HTTP failures onto [`ApiError`]. Each call issues exactly one request:
//! there is no retry and no caching.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::{ApiError, Result};
use super::types::{Record, Source, Table};
use crate::config::Backend;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The data API client.
///
/// Requests carry the backend's anon key as `apikey`, and the session access
/// token (or the anon key when signed out) as the bearer token.
#[derive(Clone)]
pub struct DataClient {
    /// The HTTP client.
    client: Client,
    /// The base URL of the backend project.
    base_url: String,
    /// Public API key.
    anon_key: String,
    /// Session access token, if signed in.
    access_token: Option<String>,
}

impl std::fmt::Debug for DataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataClient")
            .field("base_url", &self.base_url)
            .field("signed_in", &self.access_token.is_some())
            .finish()
    }
}

impl DataClient {
    /// Create a client for a configured backend.
    pub fn new(backend: &Backend, timeout_secs: u64) -> Result<Self> {
        Self::with_credentials(&backend.url, &backend.anon_key, timeout_secs)
    }

    /// Create a client from explicit credentials.
    pub fn with_credentials(base_url: &str, anon_key: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            base_url: normalize_base_url(base_url),
            anon_key: anon_key.to_string(),
            access_token: None,
        })
    }

    /// Attach (or clear) the session access token.
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every row for a dashboard table.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn fetch(&self, table: Table) -> Result<Vec<Record>> {
        match table.source() {
            Source::Table(name) => self.select_all(name).await,
            Source::Rpc(function) => {
                let value = self.rpc(function, &Value::Object(Default::default())).await?;
                into_records(value)
            }
        }
    }

    /// Read an entire table.
    ///
    /// Calls `GET /rest/v1/{table}?select=*`.
    #[instrument(skip(self))]
    pub async fn select_all(&self, table: &str) -> Result<Vec<Record>> {
        let url = format!("{}?select=*", self.table_url(table));
        let records: Vec<Record> = self.send(self.request(Method::GET, &url)).await?;
        debug!("Fetched {} rows from {}", records.len(), table);
        Ok(records)
    }

    /// Insert one row and return it as stored.
    #[instrument(skip(self, record))]
    pub async fn insert(&self, table: &str, record: &Record) -> Result<Record> {
        let url = self.table_url(table);
        let request = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(record);
        let rows: Vec<Record> = self.send(request).await?;
        first_row(rows, table)
    }

    /// Patch the row whose `id_column` equals `id`.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        table: &str,
        id_column: &str,
        id: &str,
        patch: &Record,
    ) -> Result<Record> {
        let url = format!("{}?{}", self.table_url(table), eq_filter(id_column, id));
        let request = self
            .request(Method::PATCH, &url)
            .header("Prefer", "return=representation")
            .json(patch);
        let rows: Vec<Record> = self.send(request).await?;
        first_row(rows, table)
    }

    /// Delete the row whose `id_column` equals `id`.
    #[instrument(skip(self))]
    pub async fn delete(&self, table: &str, id_column: &str, id: &str) -> Result<()> {
        let url = format!("{}?{}", self.table_url(table), eq_filter(id_column, id));
        let response = self.request(Method::DELETE, &url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(error_from_response(status, &url, &body))
        }
    }

    /// Call a stored procedure.
    ///
    /// Calls `POST /rest/v1/rpc/{function}` with `params` as the JSON body.
    #[instrument(skip(self, params))]
    pub async fn rpc(&self, function: &str, params: &Value) -> Result<Value> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        self.send(self.request(Method::POST, &url).json(params)).await
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, urlencoding::encode(table))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(self.anon_key.as_str());
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
            .header(header::ACCEPT, "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        handle_response(response).await
    }
}

/// Build the HTTP client with appropriate settings.
pub(crate) fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(ApiError::Network)
}

/// Handle the HTTP response, checking for errors and parsing JSON.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let url = response.url().to_string();

    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    } else {
        let body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", body);
        Err(error_from_response(status, &url, &body))
    }
}

/// Create an appropriate error from an HTTP response.
///
/// The backend reports failures as JSON with one of `message`, `msg`,
/// `error_description` or `error`; that text is passed through.
pub(crate) fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    match message {
        Some(message) if !message.is_empty() => ApiError::from_status(status, &message),
        _ => ApiError::from_status(status, url),
    }
}

/// Build a PostgREST equality filter, e.g. `id=eq.42`.
fn eq_filter(column: &str, value: &str) -> String {
    format!(
        "{}=eq.{}",
        urlencoding::encode(column),
        urlencoding::encode(value)
    )
}

fn first_row(rows: Vec<Record>, table: &str) -> Result<Record> {
    rows.into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound(format!("no row returned from {}", table)))
}

/// Convert a procedure result into rows.
///
/// Procedures may return a set (array of objects) or a single object.
fn into_records(value: Value) -> Result<Vec<Record>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(ApiError::InvalidResponse(format!(
                    "expected a row object, got {}",
                    other
                ))),
            })
            .collect(),
        Value::Object(map) => Ok(vec![map]),
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::InvalidResponse(format!(
            "expected rows, got {}",
            other
        ))),
    }
}

/// Normalize the base URL by removing trailing slashes.
pub(crate) fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}
