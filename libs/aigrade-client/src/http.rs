/// HTTP Client Wrapper
///
/// Uniform request/response contract for every network call:
/// - URL = base (trailing `/` removed) + path (leading `/` ensured)
/// - JSON content type, caller headers, bearer token when a session exists
/// - Per-request timeout (default from configuration, 30s)
/// - `http://` and `https://` bases (rustls, webpki roots)
/// - Never fails by `Err`: every outcome is an [`ApiResponse`]
///
/// **Failure classification:**
/// - connection failure → status 0, network error message
/// - timeout → status 0, `Request timeout after {N}ms`
/// - non-2xx → HTTP status, server `message`/`detail` or the reason phrase
/// - anything else → status 0, the error's own message

use crate::session::SessionStore;
use aigrade_common::envelope::{decode_list, unwrap_payload};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error};

pub const NETWORK_ERROR: &str =
    "Network error. Please check your connection and that the server is running.";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub ok: bool,
    /// HTTP status, or 0 when no response was received
    pub status: u16,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Failed response, for callers that prefer `?`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            ok: self.ok,
            status: self.status,
            data: self.data.map(f),
            error: self.error,
        }
    }

    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(ApiError {
                status: self.status,
                message: self.error.unwrap_or_else(|| "Request failed".to_string()),
            })
        }
    }
}

impl ApiResponse<Value> {
    /// Convert the body with `f`; a shape mismatch becomes a failed response
    pub fn decode_with<T>(
        self,
        f: impl FnOnce(Value) -> Result<T, serde_json::Error>,
    ) -> ApiResponse<T> {
        if !self.ok {
            return ApiResponse {
                ok: false,
                status: self.status,
                data: None,
                error: self.error,
            };
        }

        match self.data {
            None => ApiResponse {
                ok: true,
                status: self.status,
                data: None,
                error: None,
            },
            Some(value) => match f(value) {
                Ok(data) => ApiResponse {
                    ok: true,
                    status: self.status,
                    data: Some(data),
                    error: None,
                },
                Err(e) => ApiResponse::failure(self.status, format!("Unexpected response shape: {}", e)),
            },
        }
    }

    /// Decode the envelope payload (`data` when present, else the whole body)
    pub fn decode_payload<T: DeserializeOwned>(self) -> ApiResponse<T> {
        self.decode_with(|v| serde_json::from_value(unwrap_payload(v)))
    }

    /// Decode a list found at the body, `data` or `data.data`
    pub fn decode_list<T: DeserializeOwned>(self) -> ApiResponse<Vec<T>> {
        self.decode_with(decode_list)
    }

    /// Unwrapped envelope payload, left as JSON
    pub fn payload(self) -> ApiResponse<Value> {
        self.map(unwrap_payload)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the client default
    pub timeout: Option<Duration>,
    /// Extra headers; they replace defaults with the same name
    pub headers: Vec<(String, String)>,
    /// Do not attach the session token (requests to third-party hosts)
    pub skip_auth: bool,
}

/// Join base and path without doubling or dropping the slash.
/// Absolute `http(s)://` paths are used as they are.
pub fn resolve_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.strip_suffix('/').unwrap_or(base);
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

enum SendError {
    Connect,
    Other(String),
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    base_url: String,
    default_timeout: Duration,
    session: SessionStore,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, default_timeout: Duration, session: SessionStore) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let inner = Client::builder(TokioExecutor::new()).build(connector);
        Self {
            inner,
            base_url: base_url.into(),
            default_timeout,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn get(&self, path: &str) -> ApiResponse<Value> {
        self.request(Method::GET, path, None, &RequestOptions::default()).await
    }

    pub async fn delete(&self, path: &str) -> ApiResponse<Value> {
        self.request(Method::DELETE, path, None, &RequestOptions::default()).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResponse<Value> {
        self.send_json(Method::POST, path, body, &RequestOptions::default()).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResponse<Value> {
        self.send_json(Method::PUT, path, body, &RequestOptions::default()).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResponse<Value> {
        self.send_json(Method::PATCH, path, body, &RequestOptions::default()).await
    }

    /// Serialize `body` and send it; an encoding failure is returned as a value
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> ApiResponse<Value> {
        match serde_json::to_value(body) {
            Ok(value) => self.request(method, path, Some(value), options).await,
            Err(e) => ApiResponse::failure(0, e.to_string()),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> ApiResponse<Value> {
        let url = resolve_url(&self.base_url, path);
        let timeout = options.timeout.unwrap_or(self.default_timeout);

        let mut builder = Request::builder().method(method.clone()).uri(url.as_str());
        if let Some(headers) = builder.headers_mut() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

            for (name, value) in &options.headers {
                match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                    (Ok(name), Ok(value)) => {
                        headers.insert(name, value);
                    }
                    _ => return ApiResponse::failure(0, format!("Invalid header: {}", name)),
                }
            }

            if !options.skip_auth {
                if let Some(token) = self.session.token() {
                    match HeaderValue::from_str(&format!("Bearer {}", token)) {
                        Ok(value) => {
                            headers.insert(AUTHORIZATION, value);
                        }
                        Err(_) => return ApiResponse::failure(0, "Stored session token is not a valid header value"),
                    }
                }
            }
        }

        let payload = match &body {
            Some(value) => {
                debug!(method = %method, url = %url, body = %value, "API request");
                Bytes::from(value.to_string())
            }
            None => {
                debug!(method = %method, url = %url, "API request");
                Bytes::new()
            }
        };

        let request = match builder.body(Full::new(payload)) {
            Ok(request) => request,
            Err(e) => return ApiResponse::failure(0, e.to_string()),
        };

        let start = Instant::now();
        let exchange = async {
            let response = self.inner.request(request).await.map_err(|e| {
                if e.is_connect() {
                    SendError::Connect
                } else {
                    SendError::Other(e.to_string())
                }
            })?;
            let status = response.status();
            let bytes = response
                .into_body()
                .collect()
                .await
                .map_err(|e| SendError::Other(e.to_string()))?
                .to_bytes();
            Ok::<_, SendError>((status, bytes))
        };

        // Timeout drops the exchange, aborting only the network call
        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok((status, bytes))) => {
                let response = classify(status, &bytes);
                if response.ok {
                    debug!(
                        status = response.status,
                        url = %url,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "API response"
                    );
                } else {
                    error!(
                        status = response.status,
                        url = %url,
                        error = response.error.as_deref().unwrap_or(""),
                        "API error"
                    );
                }
                response
            }
            Ok(Err(SendError::Connect)) => {
                error!(url = %url, "API unreachable");
                ApiResponse::failure(0, NETWORK_ERROR)
            }
            Ok(Err(SendError::Other(message))) => {
                error!(url = %url, error = %message, "API request failed");
                ApiResponse::failure(0, message)
            }
            Err(_) => {
                error!(url = %url, timeout_ms = timeout.as_millis() as u64, "API request timed out");
                ApiResponse::failure(0, format!("Request timeout after {}ms", timeout.as_millis()))
            }
        }
    }
}

/// Build the response value from a received status and body
fn classify(status: StatusCode, body: &[u8]) -> ApiResponse<Value> {
    let data: Option<Value> = serde_json::from_slice(body).ok();

    if status.is_success() {
        return ApiResponse {
            ok: true,
            status: status.as_u16(),
            data,
            error: None,
        };
    }

    let message = data
        .as_ref()
        .and_then(|d| text_field(d, "message").or_else(|| text_field(d, "detail")))
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => reason.to_string(),
            None => format!("HTTP {}", status.as_u16()),
        });

    ApiResponse::failure(status.as_u16(), message)
}

/// A usable error text at `key`: non-empty string, or any other non-null value
fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
