//! One HTTP request/response cycle with typed failures
//!
//! Serializes a JSON body, sends it, and decodes the JSON response into the
//! caller's expected shape. Connection failures and timeouts become
//! [`RecapitanError::Transport`]; non-2xx responses become
//! [`RecapitanError::HttpStatus`]; undecodable bodies become
//! [`RecapitanError::MalformedResponse`].

use crate::error::{RecapitanError, Result};
use crate::utils::string::truncate_at_char_boundary;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default request timeout duration
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Longest error body kept on an [`RecapitanError::HttpStatus`]
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Everything needed to issue one request
#[derive(Debug)]
pub struct RequestSpec<'a, B: ?Sized> {
    pub url: &'a str,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: &'a B,
}

impl<'a, B: ?Sized> RequestSpec<'a, B> {
    /// POST request with no extra headers
    pub fn post(url: &'a str, body: &'a B) -> Self {
        Self {
            url,
            method: Method::POST,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Attach a bearer credential
    pub fn bearer(mut self, token: &str) -> Result<Self> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            RecapitanError::Configuration("API key contains invalid header characters".to_string())
        })?;
        self.headers.insert(reqwest::header::AUTHORIZATION, value);
        Ok(self)
    }
}

/// Thin wrapper around a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecapitanError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Send the request and decode a 2xx JSON body as `T`
    pub async fn send<B, T>(&self, spec: &RequestSpec<'_, B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("{} {}", spec.method, spec.url);

        let response = self
            .client
            .request(spec.method.clone(), spec.url)
            .headers(spec.headers.clone())
            .json(spec.body)
            .send()
            .await
            .map_err(RecapitanError::Transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(RecapitanError::Transport)?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(RecapitanError::HttpStatus {
                code: status.as_u16(),
                body: truncate_at_char_boundary(body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        debug!("{} {} -> {} ({} bytes)", spec.method, spec.url, status, bytes.len());
        serde_json::from_slice(&bytes).map_err(RecapitanError::MalformedResponse)
    }
}
