//! The network seam under [`GuardedClient`](crate::GuardedClient).
//!
//! A [`Transport`] performs one raw HTTP exchange and reports either the
//! status and body it received or a [`TransportError`]. It does not
//! interpret bodies; that is the client's and normalizer's job.

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::attempt::HttpMethod;
use crate::config::API_KEY_HEADER;
use crate::error::TransportError;
use crate::secret::Secret;

/// One outgoing request.
#[derive(Debug)]
pub struct TransportRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Endpoint path, appended to the transport's base URL
    pub path: String,
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// API key to send in the `X-API-Key` header
    pub api_key: Option<Secret<String>>,
    /// JSON request body
    pub body: Option<serde_json::Value>,
    /// Cancelled when the attempt's deadline fires
    pub cancel: CancellationToken,
}

/// The raw result of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text, possibly empty
    pub body: String,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs raw HTTP exchanges.
///
/// Implementations should return [`TransportError::Cancelled`] promptly once
/// `request.cancel` fires. The client also races every call against its
/// deadline, so a transport that ignores the token is still bounded.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends `request` and returns the status and body received.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response could be read.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client.
///
/// The client carries no timeout of its own; the deadline is owned by the
/// guarded call.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Other`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| TransportError::Other(err.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wraps an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(reqwest_method(request.method), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(api_key) = &request.api_key {
            builder = builder.header(API_KEY_HEADER, api_key.expose_secret().as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let exchange = async move {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, TransportError>(TransportResponse { status, body })
        };

        tokio::select! {
            biased;
            () = request.cancel.cancelled() => Err(TransportError::Cancelled),
            result = exchange => result,
        }
    }
}
