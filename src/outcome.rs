use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{ReasonCode, Status};

/// Current instant as an ISO-8601 UTC string with millisecond precision.
pub(crate) fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The normalized, always-populated result of a guarded operation.
///
/// `T` is the payload shape of the operation; untyped calls use
/// [`serde_json::Value`]. An `Outcome` always carries a status, a timestamp
/// and a trace id. It is never partially constructed.
///
/// The wire form matches the backend envelope, so a well-formed backend body
/// deserializes straight into an `Outcome` and is passed through verbatim.
///
/// # Examples
///
/// ```
/// use console_guard::{Outcome, ReasonCode, Status};
///
/// let outcome: Outcome = Outcome::blocked("/api/memory", ReasonCode::ServerError, "Server error", 502);
///
/// assert_eq!(outcome.status, Status::Blocked);
/// assert_eq!(outcome.trace_id, "/api/memory-server-error");
/// assert!(outcome.has_reason(ReasonCode::ServerError));
/// assert_eq!(outcome.http_status, Some(502));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T = serde_json::Value> {
    /// Decision status
    pub status: Status,
    /// ISO-8601 UTC instant, `ts_utc` on the wire
    #[serde(rename = "ts_utc")]
    pub timestamp: String,
    /// Identifier correlating this outcome with a request attempt
    pub trace_id: String,
    /// Ordered machine-readable reasons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_codes: Option<Vec<String>>,
    /// Operation-specific payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// HTTP status observed, `0` when no exchange completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl<T> Outcome<T> {
    /// Builds a blocked outcome whose trace id is synthesized as
    /// `{endpoint}-{reason-slug}`.
    pub fn blocked(
        endpoint: &str,
        reason: ReasonCode,
        message: impl Into<String>,
        http_status: u16,
    ) -> Self {
        Self::blocked_with_trace(
            synthesize_trace_id(endpoint, reason),
            reason,
            message,
            http_status,
        )
    }

    /// Builds a blocked outcome with an explicit trace id.
    pub fn blocked_with_trace(
        trace_id: impl Into<String>,
        reason: ReasonCode,
        message: impl Into<String>,
        http_status: u16,
    ) -> Self {
        Self {
            status: Status::Blocked,
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            reason_codes: Some(vec![reason.as_str().to_string()]),
            data: None,
            message: Some(message.into()),
            http_status: Some(http_status),
        }
    }

    /// Returns `true` when the status is [`Status::Blocked`].
    pub fn is_blocked(&self) -> bool {
        self.status.is_blocked()
    }

    /// Returns `true` when `reason` is among the reason codes.
    pub fn has_reason(&self, reason: ReasonCode) -> bool {
        self.reason_codes
            .as_deref()
            .is_some_and(|codes| codes.iter().any(|c| c == reason.as_str()))
    }

    /// Consumes the outcome and returns its payload, if any.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Synthesizes the deterministic trace id used when the backend supplied none.
pub(crate) fn synthesize_trace_id(endpoint: &str, reason: ReasonCode) -> String {
    format!("{}-{}", endpoint, reason.slug())
}

/// The subset of an [`Outcome`] returned by
/// [`GuardedClient::execute_command`](crate::GuardedClient::execute_command).
///
/// It has no payload, message or HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteOutcome {
    /// Decision status
    pub status: Status,
    /// ISO-8601 UTC instant, `ts_utc` on the wire
    #[serde(rename = "ts_utc")]
    pub timestamp: String,
    /// Identifier correlating this outcome with a request attempt
    pub trace_id: String,
    /// Ordered machine-readable reasons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_codes: Option<Vec<String>>,
}

impl ExecuteOutcome {
    /// Returns `true` when `reason` is among the reason codes.
    pub fn has_reason(&self, reason: ReasonCode) -> bool {
        self.reason_codes
            .as_deref()
            .is_some_and(|codes| codes.iter().any(|c| c == reason.as_str()))
    }
}

impl<T> From<Outcome<T>> for ExecuteOutcome {
    fn from(outcome: Outcome<T>) -> Self {
        Self {
            status: outcome.status,
            timestamp: outcome.timestamp,
            trace_id: outcome.trace_id,
            reason_codes: outcome.reason_codes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blocked_outcome_is_fully_populated() {
        let outcome: Outcome = Outcome::blocked("/api/execute", ReasonCode::TimeoutExceeded, "t", 0);

        assert_eq!(outcome.status, Status::Blocked);
        assert!(!outcome.timestamp.is_empty());
        assert!(outcome.timestamp.ends_with('Z'));
        assert_eq!(outcome.trace_id, "/api/execute-timeout");
        assert_eq!(
            outcome.reason_codes,
            Some(vec!["TIMEOUT_EXCEEDED".to_string()])
        );
        assert_eq!(outcome.http_status, Some(0));
        assert!(outcome.data.is_none());
    }

    #[test]
    fn backend_envelope_deserializes_verbatim() {
        let body = json!({
            "status": "WARNING",
            "ts_utc": "2026-01-01T00:00:00Z",
            "trace_id": "abc123",
            "reason_codes": ["RATE_NEAR_LIMIT"],
            "data": {"k": 1}
        });

        let outcome: Outcome = serde_json::from_value(body).unwrap();

        assert_eq!(outcome.status, Status::Warning);
        assert_eq!(outcome.timestamp, "2026-01-01T00:00:00Z");
        assert_eq!(outcome.trace_id, "abc123");
        assert_eq!(outcome.data, Some(json!({"k": 1})));
        assert_eq!(outcome.http_status, None);
    }

    #[test]
    fn wire_form_uses_ts_utc() {
        let outcome: Outcome<()> =
            Outcome::blocked_with_trace("t-1", ReasonCode::UnknownError, "x", 0);
        let value = serde_json::to_value(&outcome).unwrap();

        assert!(value.get("ts_utc").is_some());
        assert!(value.get("timestamp").is_none());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn execute_outcome_projects_subset() {
        let outcome: Outcome = serde_json::from_value(json!({
            "status": "APPROVED",
            "ts_utc": "2026-01-01T00:00:00Z",
            "trace_id": "abc123",
            "data": [1, 2, 3],
            "message": "ok"
        }))
        .unwrap();

        let projected = ExecuteOutcome::from(outcome);

        assert_eq!(
            projected,
            ExecuteOutcome {
                status: Status::Approved,
                timestamp: "2026-01-01T00:00:00Z".to_string(),
                trace_id: "abc123".to_string(),
                reason_codes: None,
            }
        );
    }
}
