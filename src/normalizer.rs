//! Fail-closed normalization of transport attempts.
//!
//! [`normalize`] is total: every [`AttemptContext`], including contradictory
//! ones, maps to a fully populated [`Outcome`]. Rules are checked in a fixed
//! priority order and the first match wins:
//!
//! 1. timeout flag → `TIMEOUT_EXCEEDED`
//! 2. network-unreachable flag → `NETWORK_UNREACHABLE`
//! 3. HTTP 401/403 → `API_KEY_INVALID`
//! 4. HTTP 400 → `VALIDATION_FAILED` (trace slug `bad-request`)
//! 5. HTTP 5xx → `SERVER_ERROR`
//! 6. body present but not shape-valid → `MALFORMED_RESPONSE`
//! 7. body shape-valid with an unrecognised status → `UNKNOWN_STATUS`
//! 8. anything else → `UNKNOWN_ERROR`
//!
//! Every rule yields [`Status::Blocked`].

use serde_json::Value;

use crate::attempt::AttemptContext;
use crate::outcome::Outcome;
use crate::status::{ReasonCode, Status};

/// Envelope fields that must be present as non-empty strings.
pub const REQUIRED_FIELDS: [&str; 3] = ["status", "ts_utc", "trace_id"];

/// Maps one attempt onto a blocked [`Outcome`].
///
/// Pure and infallible. Two calls with the same context produce outcomes that
/// differ only in their timestamp.
///
/// # Examples
///
/// ```
/// use console_guard::{normalize, AttemptContext, HttpMethod, Outcome, ReasonCode, Status};
///
/// // Timeout wins over the server error
/// let ctx = AttemptContext::new("/api/execute", HttpMethod::Post)
///     .timed_out()
///     .with_http_status(500);
/// let outcome: Outcome = normalize(&ctx);
///
/// assert_eq!(outcome.status, Status::Blocked);
/// assert!(outcome.has_reason(ReasonCode::TimeoutExceeded));
/// assert_eq!(outcome.trace_id, "/api/execute-timeout");
/// assert_eq!(outcome.http_status, Some(0));
/// ```
pub fn normalize<T>(ctx: &AttemptContext) -> Outcome<T> {
    let endpoint = ctx.endpoint.as_str();
    let observed = ctx.http_status.unwrap_or(0);

    if ctx.timeout {
        let message = format!("Request timeout (>{}ms)", ctx.deadline.as_millis());
        return Outcome::blocked(endpoint, ReasonCode::TimeoutExceeded, message, 0);
    }

    if ctx.network_unreachable {
        return Outcome::blocked(
            endpoint,
            ReasonCode::NetworkUnreachable,
            "Backend unreachable",
            0,
        );
    }

    match ctx.http_status {
        Some(status @ (401 | 403)) => {
            return Outcome::blocked(
                endpoint,
                ReasonCode::ApiKeyInvalid,
                "Authentication failed",
                status,
            );
        }
        // Rejected by the backend, kept apart from the local command check
        Some(400) => {
            return Outcome::blocked_with_trace(
                format!("{}-bad-request", endpoint),
                ReasonCode::ValidationFailed,
                "Invalid request format",
                400,
            );
        }
        Some(status) if status >= 500 => {
            return Outcome::blocked(endpoint, ReasonCode::ServerError, "Server error", status);
        }
        _ => {}
    }

    if let Some(body) = &ctx.body {
        if !is_valid_response(body) || ctx.payload_error.is_some() {
            let message = match &ctx.payload_error {
                Some(detail) => format!("Backend returned invalid response: {}", detail),
                None => "Backend returned invalid response".to_string(),
            };
            return Outcome::blocked(endpoint, ReasonCode::MalformedResponse, message, observed);
        }

        let status = string_field(body, "status").unwrap_or_default();
        if Status::parse(status).is_none() {
            let message = format!("Unknown status: {}", status);
            return match string_field(body, "trace_id") {
                Some(trace_id) => Outcome::blocked_with_trace(
                    trace_id,
                    ReasonCode::UnknownStatus,
                    message,
                    observed,
                ),
                None => Outcome::blocked(endpoint, ReasonCode::UnknownStatus, message, observed),
            };
        }
    }

    let message = ctx.error.as_deref().unwrap_or("Unknown error");
    Outcome::blocked(endpoint, ReasonCode::UnknownError, message, observed)
}

/// Shape validation for a backend response body.
///
/// A body is valid when it is a JSON object whose `status`, `ts_utc` and
/// `trace_id` fields are all non-empty strings. Field values are not
/// interpreted: an unrecognised status still passes shape validation.
///
/// # Examples
///
/// ```
/// use console_guard::is_valid_response;
/// use serde_json::json;
///
/// assert!(is_valid_response(&json!({
///     "status": "APPROVED",
///     "ts_utc": "2026-01-01T00:00:00Z",
///     "trace_id": "abc123"
/// })));
/// assert!(!is_valid_response(&json!({"foo": "bar"})));
/// assert!(!is_valid_response(&json!(null)));
/// ```
pub fn is_valid_response(body: &Value) -> bool {
    body.is_object()
        && REQUIRED_FIELDS
            .iter()
            .all(|field| string_field(body, field).is_some())
}

/// Returns `true` when the body's `status` is one of the recognised values.
pub fn has_recognized_status(body: &Value) -> bool {
    string_field(body, "status").and_then(Status::parse).is_some()
}

fn string_field<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
