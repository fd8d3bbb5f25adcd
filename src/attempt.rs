use std::fmt;
use std::time::Duration;

use crate::deadline::DEFAULT_TIMEOUT;

/// HTTP method of a guarded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
}

impl HttpMethod {
    /// Returns the upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything observed during one transport attempt.
///
/// Built fresh for each attempt, handed to [`normalize`](crate::normalize)
/// and dropped. Fields may contradict each other (a timeout flag together
/// with an HTTP status, say); the normalizer resolves that by rule priority.
///
/// # Examples
///
/// ```
/// use console_guard::{normalize, AttemptContext, HttpMethod, ReasonCode};
///
/// let ctx = AttemptContext::new("/api/audit", HttpMethod::Get)
///     .with_http_status(503);
/// let outcome: console_guard::Outcome = normalize(&ctx);
///
/// assert!(outcome.has_reason(ReasonCode::ServerError));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptContext {
    /// Endpoint path, e.g. `/api/execute`
    pub endpoint: String,
    /// HTTP method used
    pub method: HttpMethod,
    /// HTTP status observed, if a response arrived
    pub http_status: Option<u16>,
    /// Raw error text, if the attempt faulted
    pub error: Option<String>,
    /// Response body, if one was received
    pub body: Option<serde_json::Value>,
    /// Why the payload could not be decoded into the expected shape
    pub payload_error: Option<String>,
    /// The deadline fired before a response arrived
    pub timeout: bool,
    /// Deadline the attempt ran under
    pub deadline: Duration,
    /// The connection failed before a response arrived
    pub network_unreachable: bool,
}

impl AttemptContext {
    /// Creates a context for an attempt against `endpoint`.
    pub fn new(endpoint: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            http_status: None,
            error: None,
            body: None,
            payload_error: None,
            timeout: false,
            network_unreachable: false,
            deadline: DEFAULT_TIMEOUT,
        }
    }

    /// Records the HTTP status that was observed.
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Records raw error text.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Records the response body.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Records that the payload did not decode into the expected type.
    pub fn with_payload_error(mut self, error: impl Into<String>) -> Self {
        self.payload_error = Some(error.into());
        self
    }

    /// Records the deadline the attempt ran under.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Marks the attempt as timed out.
    pub fn timed_out(mut self) -> Self {
        self.timeout = true;
        self
    }

    /// Marks the backend as unreachable.
    pub fn unreachable(mut self) -> Self {
        self.network_unreachable = true;
        self
    }
}
