// Async REST client for the facilities backend.
//
// Base URL: https://aaurms.eotcssu.et/api/
// Auth: `Authorization: Bearer <token>` from `auth/login`

use std::collections::BTreeMap;

use arc_swap::ArcSwapOption;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::envelope::{Ack, Envelope, Page, PageRequest};
use crate::error::Error;
use crate::resource::{DeleteStyle, ResourceKind, UpdateStyle};
use crate::transport::{RetryPolicy, TransportConfig};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://aaurms.eotcssu.et/api/";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    Many(Vec<String>),
    One(String),
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, FieldMessages>>,
}

/// Result of a create or update: the backend's message and, when it echoes
/// one back, the saved entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved<T> {
    pub message: Option<String>,
    pub data: Option<T>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the facilities REST API.
///
/// Holds one pooled `reqwest::Client`, the API root and the current session
/// token. The token lives in an [`ArcSwapOption`] so logging in or out never
/// needs `&mut self`, and concurrent requests always see a consistent value.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: ArcSwapOption<SecretString>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.has_token())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL and transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http, transport.retry)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            token: ArcSwapOption::empty(),
            retry,
        })
    }

    /// Ensure the base URL ends with `/` so relative joins keep its path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session token ────────────────────────────────────────────────

    /// Install a bearer token (after login, or restored from the keyring).
    pub fn set_token(&self, token: SecretString) {
        self.token.store(Some(std::sync::Arc::new(token)));
    }

    pub fn clear_token(&self) {
        self.token.store(None);
    }

    pub fn has_token(&self) -> bool {
        self.token.load().is_some()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"v1/campuses"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request pipeline ─────────────────────────────────────────────

    /// Send a request with bearer auth and retries.
    ///
    /// Timeouts and lost connections are retried for every method, POST
    /// included; 5xx responses only for idempotent methods. Backoff is
    /// exponential. The final response is returned as-is, whatever its
    /// status.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        let mut attempt = 0;
        loop {
            debug!("{method} {url}");

            let mut request = self.http.request(method.clone(), url.clone());
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            if let Some(token) = self.token.load_full() {
                request = request.bearer_auth(token.expose_secret());
            }

            let reason = match request.send().await {
                Ok(resp)
                    if self.retry.allows(attempt)
                        && self.retry.should_retry_status(&method, resp.status()) =>
                {
                    format!("HTTP {}", resp.status())
                }
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let err = Error::from_transport(e);
                    if !(self.retry.allows(attempt) && self.retry.should_retry_error(&method, &err))
                    {
                        return Err(err);
                    }
                    err.to_string()
                }
            };

            let delay = self.retry.delay_for(attempt);
            attempt += 1;
            warn!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "retrying {method} {url}: {reason}"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Like [`send`](Self::send) but warns when no session token is set.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;
        if !self.has_token() {
            warn!("no auth token for {method} {url}");
        }
        self.send(method, url, query, body).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Map the status code, then decode the envelope. An empty 2xx body
    /// decodes as a successful envelope without data.
    pub(crate) async fn decode<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<Envelope<T>, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let body = resp.text().await.map_err(Error::from_transport)?;
        if body.trim().is_empty() {
            return Ok(Envelope {
                status: true,
                message: None,
                data: None,
                meta: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        match status {
            StatusCode::UNAUTHORIZED => {
                return Error::Authentication {
                    message: "Invalid credentials".into(),
                };
            }
            StatusCode::NOT_FOUND => return Error::NotFound,
            StatusCode::INTERNAL_SERVER_ERROR => return Error::ServerError,
            _ => {}
        }

        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorResponse>(&raw).ok();

        let message = parsed
            .as_ref()
            .and_then(|p| p.message.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "An error occurred".to_owned());

        let errors: BTreeMap<String, Vec<String>> = parsed
            .and_then(|p| p.errors)
            .unwrap_or_default()
            .into_iter()
            .map(|(field, messages)| {
                let messages = match messages {
                    FieldMessages::Many(list) => list,
                    FieldMessages::One(one) => vec![one],
                };
                (field, messages)
            })
            .collect();

        if status != StatusCode::UNPROCESSABLE_ENTITY || errors.is_empty() {
            Error::Api {
                status: status.as_u16(),
                message,
            }
        } else {
            Error::Validation { message, errors }
        }
    }

    /// Fail on `status: false`, otherwise hand the envelope back.
    fn accept<T>(envelope: Envelope<T>) -> Result<Envelope<T>, Error> {
        if envelope.status {
            Ok(envelope)
        } else {
            Err(Error::Rejected {
                message: envelope
                    .message
                    .unwrap_or_else(|| "Request was rejected".into()),
            })
        }
    }

    fn encode<B: Serialize>(body: &B) -> Result<Value, Error> {
        serde_json::to_value(body).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request body: {e}"),
            body: String::new(),
        })
    }

    fn with_id(mut body: Value, id: u64) -> Value {
        if let Value::Object(map) = &mut body {
            map.insert("id".into(), json!(id));
        }
        body
    }

    fn require_id(kind: ResourceKind, id: u64) -> Result<(), Error> {
        if id == 0 {
            Err(Error::MissingId {
                resource: kind.title(),
            })
        } else {
            Ok(())
        }
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Fetch one page of a collection: `GET {path}?page=…&limit=…`.
    ///
    /// `extra` adds further filters, e.g. `[("buildingId", "4")]` for rooms.
    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        page: PageRequest,
        extra: &[(&str, String)],
    ) -> Result<Page<T>, Error> {
        let mut query: Vec<(&str, String)> = page.query().into_iter().collect();
        query.extend(extra.iter().cloned());

        let resp = self.request(Method::GET, kind.path(), &query, None).await?;
        let envelope = Self::accept(Self::decode::<Vec<T>>(resp).await?)?;
        let data = envelope.data.unwrap_or_default();
        let meta = envelope
            .meta
            .unwrap_or_else(|| crate::envelope::PageMeta::single(data.len()));

        Ok(Page { data, meta })
    }

    /// Fetch every page of a collection, one request per page.
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        limit: u64,
        extra: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let mut all = Vec::new();
        let mut page = PageRequest::first(limit);
        loop {
            let batch: Page<T> = self.list(kind, page, extra).await?;
            let done = batch.is_empty() || batch.meta.current_page >= batch.meta.last_page;
            all.extend(batch.data);
            if done {
                return Ok(all);
            }
            page.page += 1;
        }
    }

    /// Fetch a single entity: `GET {path}/{id}`.
    pub async fn get<T: DeserializeOwned>(&self, kind: ResourceKind, id: u64) -> Result<T, Error> {
        let resp = self
            .request(Method::GET, &kind.item_path(id), &[], None)
            .await?;
        let envelope = Self::accept(Self::decode::<T>(resp).await?)?;
        envelope.data.ok_or(Error::NotFound)
    }

    /// Create an entity: `POST {path}`.
    pub async fn create<B, T>(&self, kind: ResourceKind, body: &B) -> Result<Saved<T>, Error>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let body = Self::encode(body)?;
        let resp = self
            .request(Method::POST, kind.path(), &[], Some(&body))
            .await?;
        let envelope = Self::accept(Self::decode::<T>(resp).await?)?;
        Ok(Saved {
            message: envelope.message,
            data: envelope.data,
        })
    }

    /// Update an entity using the resource's [`UpdateStyle`].
    pub async fn update<B, T>(
        &self,
        kind: ResourceKind,
        id: u64,
        body: &B,
    ) -> Result<Saved<T>, Error>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        Self::require_id(kind, id)?;
        let body = Self::encode(body)?;

        let (method, path, body) = match kind.update_style() {
            UpdateStyle::PutCollection => {
                (Method::PUT, kind.path().to_owned(), Self::with_id(body, id))
            }
            UpdateStyle::PutById => (Method::PUT, kind.item_path(id), body),
            UpdateStyle::PatchById => (Method::PATCH, kind.item_path(id), Self::with_id(body, id)),
        };

        let resp = self.request(method, &path, &[], Some(&body)).await?;
        let envelope = Self::accept(Self::decode::<T>(resp).await?)?;
        Ok(Saved {
            message: envelope.message,
            data: envelope.data,
        })
    }

    /// Delete an entity using the resource's [`DeleteStyle`].
    pub async fn delete(&self, kind: ResourceKind, id: u64) -> Result<Ack, Error> {
        Self::require_id(kind, id)?;

        let resp = match kind.delete_style() {
            DeleteStyle::CollectionWithBody => {
                let body = json!({ "id": id });
                self.request(Method::DELETE, kind.path(), &[], Some(&body))
                    .await?
            }
            DeleteStyle::ById => {
                self.request(Method::DELETE, &kind.item_path(id), &[], None)
                    .await?
            }
        };

        let envelope = Self::accept(Self::decode::<Value>(resp).await?)?;
        Ok(Ack {
            message: envelope.message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client =
            ApiClient::new("https://example.test/api", &TransportConfig::default()).unwrap();
        assert_eq!(client.base_url().as_str(), "https://example.test/api/");
        assert_eq!(
            client.url("v1/campuses").unwrap().as_str(),
            "https://example.test/api/v1/campuses"
        );
    }

    #[test]
    fn token_slot() {
        let client = ApiClient::new(DEFAULT_BASE_URL, &TransportConfig::default()).unwrap();
        assert!(!client.has_token());
        client.set_token(SecretString::from("abc".to_owned()));
        assert!(client.has_token());
        client.clear_token();
        assert!(!client.has_token());
    }

    #[test]
    fn debug_hides_token() {
        let client = ApiClient::new(DEFAULT_BASE_URL, &TransportConfig::default()).unwrap();
        client.set_token(SecretString::from("super-secret".to_owned()));
        let shown = format!("{client:?}");
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("authenticated: true"));
    }

    #[test]
    fn id_merged_into_object_bodies() {
        let body = ApiClient::with_id(json!({"name": "Main"}), 4);
        assert_eq!(body, json!({"name": "Main", "id": 4}));
    }
}
