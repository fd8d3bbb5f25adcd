//! Fail-closed request boundary for a governed console backend.
//!
//! Every network call resolves to a well-typed result. Anything slow,
//! malformed, unauthenticated or otherwise ambiguous becomes a
//! [`Status::Blocked`] [`Outcome`] instead of an error, a hang, or a
//! silently accepted bad body.
//!
//! # Core Types
//!
//! - [`normalize`]: pure, total mapping from an [`AttemptContext`] to an [`Outcome`]
//! - [`GuardedClient`]: deadline-bounded calls plus the execute, audit and memory operations
//! - [`Deadline`]: per-attempt cancellation token that releases its timer on every path
//! - [`Transport`]: the network seam, with [`ReqwestTransport`] as the HTTP implementation
//! - [`ConsoleConfig`]: immutable settings, loaded once
//! - [`Secret<T>`]: keeps the API key out of logs
//!
//! # Examples
//!
//! ```
//! use console_guard::{normalize, AttemptContext, HttpMethod, Outcome, ReasonCode, Status};
//! use serde_json::json;
//!
//! // A 200 whose body lacks the envelope fields is blocked, not trusted.
//! let ctx = AttemptContext::new("/api/execute", HttpMethod::Post)
//!     .with_http_status(200)
//!     .with_body(json!({"foo": "bar"}));
//! let outcome: Outcome = normalize(&ctx);
//!
//! assert_eq!(outcome.status, Status::Blocked);
//! assert!(outcome.has_reason(ReasonCode::MalformedResponse));
//! assert_eq!(outcome.http_status, Some(200));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attempt;
mod client;
mod config;
mod deadline;
mod error;
mod normalizer;
mod outcome;
mod records;
mod sanitizer;
mod secret;
mod status;
mod tainted;
mod transport;
mod verified;

pub use attempt::{AttemptContext, HttpMethod};
pub use client::{
    GuardedClient, RequestOptions, AUDIT_ENDPOINT, AUDIT_FALLBACK_ENDPOINT, EXECUTE_ENDPOINT,
    MEMORY_ENDPOINT,
};
pub use config::{ConsoleConfig, API_KEY_HEADER, ENV_API_KEY, ENV_API_URL, ENV_TIMEOUT_MS};
pub use deadline::{Deadline, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_MS};
pub use error::{ConfigError, TransportError};
pub use normalizer::{has_recognized_status, is_valid_response, normalize, REQUIRED_FIELDS};
pub use outcome::{ExecuteOutcome, Outcome};
pub use records::{AuditQuery, AuditRecord, MemorySnapshot};
pub use sanitizer::{CommandSanitizer, SanitizationError, SanitizationErrorKind, Sanitizer};
pub use secret::Secret;
pub use status::{validate_status, ReasonCode, Status, RECOGNIZED_STATUSES};
pub use tainted::Tainted;
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use verified::Verified;
