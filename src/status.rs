use std::fmt;

use serde::{Deserialize, Serialize};

/// Every status string the backend contract recognises.
pub const RECOGNIZED_STATUSES: [&str; 5] = ["APPROVED", "BLOCKED", "EXPIRED", "WARNING", "NEUTRAL"];

/// Decision status carried by every [`Outcome`](crate::Outcome).
///
/// `Blocked` is the universal safe default: anything ambiguous resolves to it.
///
/// # Examples
///
/// ```
/// use console_guard::Status;
///
/// assert_eq!(Status::parse("APPROVED"), Some(Status::Approved));
/// assert_eq!(Status::parse("approved"), None);
/// assert_eq!(Status::default(), Status::Blocked);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// The backend approved the request
    Approved,
    /// The request was denied, or something went wrong on the way
    #[default]
    Blocked,
    /// The referenced session or grant has expired
    Expired,
    /// Accepted with a caveat
    Warning,
    /// No decision was made
    Neutral,
}

impl Status {
    /// Parses the exact wire name of a status. Matching is case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "APPROVED" => Some(Self::Approved),
            "BLOCKED" => Some(Self::Blocked),
            "EXPIRED" => Some(Self::Expired),
            "WARNING" => Some(Self::Warning),
            "NEUTRAL" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Blocked => "BLOCKED",
            Self::Expired => "EXPIRED",
            Self::Warning => "WARNING",
            Self::Neutral => "NEUTRAL",
        }
    }

    /// Returns `true` for [`Status::Blocked`].
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coerces an arbitrary JSON value into a [`Status`].
///
/// Only a string holding one of the five recognised names maps to its
/// variant. Everything else, including `null`, numbers and lower-case
/// spellings, becomes [`Status::Blocked`].
///
/// # Examples
///
/// ```
/// use console_guard::{validate_status, Status};
/// use serde_json::json;
///
/// assert_eq!(validate_status(&json!("WARNING")), Status::Warning);
/// assert_eq!(validate_status(&json!("MAYBE")), Status::Blocked);
/// assert_eq!(validate_status(&json!(42)), Status::Blocked);
/// ```
pub fn validate_status(value: &serde_json::Value) -> Status {
    value.as_str().and_then(Status::parse).unwrap_or_default()
}

/// Machine-readable reason attached to a blocked outcome.
///
/// Backends may send reason codes outside this taxonomy; those travel as
/// plain strings in [`Outcome::reason_codes`](crate::Outcome::reason_codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    /// The deadline fired before a response arrived
    TimeoutExceeded,
    /// The connection failed before any response arrived
    NetworkUnreachable,
    /// The backend answered 401 or 403
    ApiKeyInvalid,
    /// The backend answered 400, or the input was rejected locally
    ValidationFailed,
    /// The backend answered with a 5xx status
    ServerError,
    /// The response body did not have the required shape
    MalformedResponse,
    /// The response carried a status outside the recognised set
    UnknownStatus,
    /// No specific rule matched
    UnknownError,
}

impl ReasonCode {
    /// Returns the wire name, e.g. `TIMEOUT_EXCEEDED`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeoutExceeded => "TIMEOUT_EXCEEDED",
            Self::NetworkUnreachable => "NETWORK_UNREACHABLE",
            Self::ApiKeyInvalid => "API_KEY_INVALID",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::ServerError => "SERVER_ERROR",
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::UnknownStatus => "UNKNOWN_STATUS",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Returns the suffix used when synthesizing a trace id for this reason.
    ///
    /// A backend 400 is the one exception: it is traced as `bad-request`.
    pub(crate) fn slug(&self) -> &'static str {
        match self {
            Self::TimeoutExceeded => "timeout",
            Self::NetworkUnreachable => "network-error",
            Self::ApiKeyInvalid => "auth-failed",
            Self::ValidationFailed => "validation-failed",
            Self::ServerError => "server-error",
            Self::MalformedResponse => "malformed-response",
            Self::UnknownStatus => "unknown-status",
            Self::UnknownError => "unknown-error",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
