//! # sheetlink-http
//!
//! HTTP transport for the two remote API surfaces (document data and file
//! management). An [`ApiClient`] is bound to one base URL; the credential is
//! re-resolved on every request so rotating tokens are always fresh, and
//! error responses are normalized into the crate's error taxonomy.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sheetlink_auth::{AuthDirective, AuthError, Credential};
use thiserror::Error;

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors surfaced by the transport layer.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The remote service returned a structured `{code, message}` error body.
    #[error("Service error - [{code}] {message}")]
    Service { code: i64, message: String },

    /// Access denied under an API-key credential. API keys can only read
    /// public documents.
    #[error("Document is private. Use a bearer-capable credential or make the document public")]
    PrivateDocument,

    /// Non-success status with no recognizable structured error body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, HttpError>;

/// Endpoint and timeout configuration shared by both API surfaces.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the document-data surface, without a trailing slash.
    pub sheets_base_url: String,
    /// Base URL of the file-management surface, without a trailing slash.
    pub files_base_url: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            sheets_base_url: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
            files_base_url: "https://www.googleapis.com/drive/v3/files".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// HTTP client bound to one API surface.
///
/// `path` arguments are appended verbatim to the base URL, so both
/// slash-separated subresources (`/values/A1:B2`) and colon-suffixed RPC
/// names (`:batchUpdate`) compose naturally.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credential: Credential,
}

/// Query pairs. Repeated keys serialize as repeated parameters
/// (`ranges=A1:B2&ranges=C1:D2`), which is the list convention the remote
/// API expects.
pub type Query<'a> = [(&'a str, String)];

impl ApiClient {
    /// Build a client for one API surface.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Transport` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: impl Into<String>, credential: Credential, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            credential,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &Query<'_>) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {url}");
        let response = self.dispatch(self.http.get(&url).query(query)).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B, T>(&self, path: &str, query: &Query<'_>, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!("POST {url}");
        let response = self
            .dispatch(self.http.post(&url).query(query).json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// PUT a JSON body and decode a JSON response.
    pub async fn put_json<B, T>(&self, path: &str, query: &Query<'_>, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!("PUT {url}");
        let response = self
            .dispatch(self.http.put(&url).query(query).json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// DELETE a resource, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        tracing::debug!("DELETE {url}");
        self.dispatch(self.http.delete(&url)).await?;
        Ok(())
    }

    /// GET a binary payload from an absolute URL (export downloads live on a
    /// different host than the API surfaces), with this client's credential.
    pub async fn get_bytes(&self, absolute_url: &str, query: &Query<'_>) -> Result<Vec<u8>> {
        tracing::debug!("GET {absolute_url}");
        let response = self
            .dispatch(self.http.get(absolute_url).query(query))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach a freshly resolved auth directive and send; normalize failures.
    async fn dispatch(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let request = match self.credential.resolve().await? {
            AuthDirective::QueryParam { key, value } => request.query(&[(key, value)]),
            AuthDirective::Header { value } => {
                request.header(reqwest::header::AUTHORIZATION, value)
            }
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("request failed with HTTP {}: {}", status.as_u16(), body);

        if status == reqwest::StatusCode::FORBIDDEN && self.credential.is_read_only() {
            return Err(HttpError::PrivateDocument);
        }
        if let Some(service) = parse_service_error(&body) {
            return Err(service);
        }
        Err(HttpError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Recognize the service's structured error body, if present.
fn parse_service_error(body: &str) -> Option<HttpError> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }

    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        code: Option<i64>,
        message: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    Some(HttpError::Service {
        code: parsed.error.code?,
        message: parsed.error.message.unwrap_or_default(),
    })
}
