pub mod rate;

use crate::config::Config;
use crate::error::{ApiError, ClientError};
use crate::types::Attachment;
use log::{debug, warn};
use rate::RateLimiter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{multipart, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const LOG_BODY_LIMIT: usize = 200;

/// Query string pairs; array values use the `key[]` convention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opt<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.0.push((key.to_string(), v.to_string()));
        }
        self
    }

    pub fn list<V: ToString>(mut self, key: &str, values: Option<&[V]>) -> Self {
        for v in values.unwrap_or_default() {
            self.0.push((format!("{}[]", key), v.to_string()));
        }
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

enum Payload<'a> {
    Empty,
    Json(&'a Value),
    Form(multipart::Form),
}

/// Authenticated, rate-limited client for the Freelo REST API.
#[derive(Debug)]
pub struct FreeloClient {
    http: Client,
    base_url: String,
    email: String,
    api_key: String,
    limiter: RateLimiter,
}

pub fn build_client(cfg: &Config) -> Result<Client, ClientError> {
    let mut default_headers = HeaderMap::new();
    let ua = HeaderValue::from_str(&cfg.user_agent())
        .map_err(|e| ClientError::Build(format!("invalid user agent: {}", e)))?;
    default_headers.insert(USER_AGENT, ua);
    let builder = Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls();
    Ok(builder.build()?)
}

/// Best-effort human message from an error body: `message`, then the first
/// entry of `errors`, then `error`.
pub fn extract_error_message(body: &str) -> String {
    const FALLBACK: &str = "Unknown error";
    let Ok(v) = serde_json::from_str::<Value>(body) else {
        return FALLBACK.to_string();
    };
    let as_text = |v: &Value| -> Option<String> {
        match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(o) => o
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            _ => None,
        }
    };
    v.get("message")
        .and_then(as_text)
        .or_else(|| {
            v.get("errors")
                .and_then(|e| e.as_array())
                .and_then(|a| a.first())
                .and_then(as_text)
        })
        .or_else(|| v.get("error").and_then(as_text))
        .unwrap_or_else(|| FALLBACK.to_string())
}

pub fn map_status_to_error(status: StatusCode, body: &str) -> ApiError {
    ApiError {
        error: status.canonical_reason().unwrap_or("").to_string(),
        message: extract_error_message(body),
        status_code: status.as_u16(),
    }
}

pub fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn truncate(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

impl FreeloClient {
    pub fn new(cfg: &Config) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_client(cfg)?,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            email: cfg.email.clone(),
            api_key: cfg.api_key.clone(),
            limiter: RateLimiter::new(cfg.rate_limit, cfg.rate_window()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        payload: Payload<'_>,
        accept: &'static str,
    ) -> Result<Response, ClientError> {
        self.limiter.acquire().await;

        let url = format!("{}{}", self.base_url, path);
        if query.is_empty() {
            debug!("HTTP {} {}", method, path);
        } else {
            debug!("HTTP {} {} {:?}", method, path, query.pairs());
        }

        let mut req = self
            .http
            .request(method.clone(), &url)
            .basic_auth(&self.email, Some(&self.api_key))
            .header(ACCEPT, HeaderValue::from_static(accept));
        if !query.is_empty() {
            req = req.query(query.pairs());
        }
        req = match payload {
            Payload::Empty => req,
            Payload::Json(body) => req.json(body),
            Payload::Form(form) => req.multipart(form),
        };

        let res = req.send().await.map_err(|e| {
            warn!("HTTP {} {} transport error: {}", method, path, e);
            ClientError::Transport(e)
        })?;

        let status = res.status();
        if status.is_client_error() || status.is_server_error() {
            let text = res.text().await.unwrap_or_default();
            warn!(
                "HTTP {} {} -> {}: {}",
                method,
                path,
                status,
                truncate(&text, LOG_BODY_LIMIT)
            );
            return Err(map_status_to_error(status, &text).into());
        }
        Ok(res)
    }

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Vec<u8>, ClientError> {
        let payload = body.map_or(Payload::Empty, Payload::Json);
        let res = self
            .send(method, path, query, payload, "application/json")
            .await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        debug!(
            "HTTP response {}: {}",
            status,
            truncate(&String::from_utf8_lossy(&bytes), LOG_BODY_LIMIT)
        );
        Ok(bytes.to_vec())
    }

    /// Issue one JSON request and decode the response into `T`.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let bytes = self.send_json(method, path, query, body).await?;
        // empty bodies decode as null so unit-like targets still work
        let slice: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(slice).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Issue one JSON request whose response body is irrelevant.
    pub async fn invoke_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(), ClientError> {
        self.send_json(method, path, &Query::new(), body).await?;
        Ok(())
    }

    pub(crate) fn to_body<B: Serialize>(body: &B) -> Result<Value, ClientError> {
        serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Multipart upload under the form field `file`.
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<Attachment, ClientError> {
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);
        let res = self
            .send(Method::POST, path, &Query::new(), Payload::Form(form), "application/json")
            .await?;
        let bytes = res.bytes().await?;
        debug!(
            "HTTP upload response: {}",
            truncate(&String::from_utf8_lossy(&bytes), LOG_BODY_LIMIT)
        );
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// GET returning the raw response bytes.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let res = self
            .send(
                Method::GET,
                path,
                &Query::new(),
                Payload::Empty,
                "application/octet-stream, */*",
            )
            .await?;
        let bytes = res.bytes().await?;
        debug!("HTTP download {} -> {} bytes", path, bytes.len());
        Ok(bytes.to_vec())
    }
}
