// Billing backend HTTP client
//
// Wraps `reqwest::Client` with URL construction under `/api/v1/`, envelope
// unwrapping, and error-body parsing. Endpoint groups (users, transactions,
// packages) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::Envelope;

/// Error body shape used by the backend on failures.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Async client for the billing backend REST surface.
///
/// All methods return unwrapped payloads; the `{ data }` envelope is
/// stripped before the caller sees it. Failures are always returned as
/// [`Error`], never logged and dropped.
#[derive(Debug, Clone)]
pub struct BillingClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BillingClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://localhost:8080`); the
    /// `/api/v1/` prefix is appended unless it is already present.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The normalized API base URL (always ends in `/api/v1/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/v1/"));
        }
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"traditional-users/allUsers"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    /// POST with query parameters and no body.
    pub(crate) async fn post_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("POST {url} params={params:?}");

        let resp = self.http.post(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    /// POST with a JSON body.
    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// PUT with query parameters and no body.
    pub(crate) async fn put_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("PUT {url} params={params:?}");

        let resp = self.http.put(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    /// POST with query parameters, accepting any acknowledgement body.
    pub(crate) async fn post_query_ack(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url} params={params:?}");

        let resp = self.http.post(url).query(params).send().await?;
        self.handle_ack(resp).await
    }

    /// POST with a JSON body, accepting any acknowledgement body.
    pub(crate) async fn post_json_ack<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_ack(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Decode a 2xx body through [`Envelope`]; `None` means the body was
    /// empty or carried no payload.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        trace!(len = body.len(), "response body received");
        if body.trim().is_empty() {
            return Ok(None);
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;
        Ok(envelope.into_data())
    }

    /// Acknowledgement endpoints answer with JSON, plain text, or nothing.
    /// Non-JSON text is kept as a JSON string.
    async fn handle_ack(&self, resp: reqwest::Response) -> Result<serde_json::Value, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(trimmed)
            .unwrap_or_else(|_| serde_json::Value::String(trimmed.to_owned())))
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorBody>(&raw)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                }
            });

        Error::Backend {
            status: status.as_u16(),
            message,
        }
    }
}
