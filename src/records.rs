//! Payload shapes for the audit and memory operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters for [`GuardedClient::fetch_audit_log`](crate::GuardedClient::fetch_audit_log).
///
/// Defaults to every record, at most 50.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    /// Record filter understood by the backend, `all` for no filtering
    pub filter: String,
    /// Maximum number of records requested
    pub limit: u32,
}

impl AuditQuery {
    /// Default filter.
    pub const DEFAULT_FILTER: &'static str = "all";
    /// Default limit.
    pub const DEFAULT_LIMIT: u32 = 50;

    /// Creates a query.
    pub fn new(filter: impl Into<String>, limit: u32) -> Self {
        Self {
            filter: filter.into(),
            limit,
        }
    }
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FILTER, Self::DEFAULT_LIMIT)
    }
}

/// One gate decision from the backend's audit trail.
///
/// The backend records only metadata and digests, never raw payloads. Every
/// field is optional so that older or partial records still decode; fields
/// this type does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Trace id of the request that produced the decision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// When the decision was made, ISO-8601 UTC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_utc: Option<String>,
    /// `ALLOW` or `DENY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    /// Action profile that matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    /// Fingerprint of the policy profile used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_hash: Option<String>,
    /// Rules that ran without denying
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_rules: Vec<String>,
    /// Reasons behind the decision
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_codes: Vec<String>,
    /// SHA-256 of the canonicalized input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_digest: Option<String>,
    /// Record kind, e.g. `decision_audit`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Any other fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuditRecord {
    /// Returns `true` when the recorded decision was a denial.
    pub fn is_denied(&self) -> bool {
        self.decision.as_deref() == Some("DENY")
    }
}

/// A point-in-time snapshot of the backend's memory surface.
///
/// Always a JSON object; anything else fails to decode and the fetch
/// resolves to nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemorySnapshot(Map<String, Value>);

impl MemorySnapshot {
    /// Looks up one top-level entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the top-level entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Consumes the snapshot and returns the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}
