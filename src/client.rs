use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::Instrument;

use crate::attempt::{AttemptContext, HttpMethod};
use crate::config::ConsoleConfig;
use crate::deadline::Deadline;
use crate::error::TransportError;
use crate::normalizer::{has_recognized_status, is_valid_response, normalize};
use crate::outcome::{ExecuteOutcome, Outcome};
use crate::records::{AuditQuery, AuditRecord, MemorySnapshot};
use crate::sanitizer::{CommandSanitizer, Sanitizer};
use crate::secret::Secret;
use crate::status::ReasonCode;
use crate::tainted::Tainted;
use crate::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

/// Command execution endpoint.
pub const EXECUTE_ENDPOINT: &str = "/api/execute";
/// Primary audit trail endpoint.
pub const AUDIT_ENDPOINT: &str = "/api/audit";
/// Diagnostics surface used when the audit endpoint is blocked.
pub const AUDIT_FALLBACK_ENDPOINT: &str = "/api/diagnostic/metrics";
/// Memory snapshot endpoint.
pub const MEMORY_ENDPOINT: &str = "/api/memory";

/// Per-call options for [`GuardedClient::guarded_call`].
///
/// # Examples
///
/// ```
/// use console_guard::RequestOptions;
/// use serde_json::json;
///
/// let options = RequestOptions::new()
///     .authenticated()
///     .query("limit", "10")
///     .json(json!({"command": "STATUS"}));
/// # let _ = options;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    body: Option<Value>,
    query: Vec<(String, String)>,
    authenticated: bool,
}

impl RequestOptions {
    /// Options for an unauthenticated request with no body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `body` as JSON.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attaches the configured API key.
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }
}

/// The fail-closed request boundary.
///
/// Every operation returns a value and never an error: faults, timeouts and
/// bad bodies all resolve to a [`Status::Blocked`](crate::Status::Blocked)
/// outcome, an empty sequence or `None`. Calls share no mutable state, so
/// any number of them may run concurrently.
///
/// # Examples
///
/// ```no_run
/// use console_guard::{AuditQuery, ConsoleConfig, GuardedClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GuardedClient::from_config(ConsoleConfig::from_env()?)?;
///
/// let outcome = client.execute_command("RUN_DIAGNOSTIC", Some("session-1")).await;
/// if outcome.status.is_blocked() {
///     // render the block; it is a legitimate state
/// }
///
/// let records = client.fetch_audit_log(&AuditQuery::default()).await;
/// let snapshot = client.fetch_memory_snapshot().await;
/// # let _ = (records, snapshot);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GuardedClient<T = ReqwestTransport> {
    transport: T,
    config: ConsoleConfig,
    sanitizer: CommandSanitizer,
}

impl GuardedClient<ReqwestTransport> {
    /// Creates a client talking HTTP to `config.base_url()`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the HTTP client cannot be built.
    pub fn from_config(config: ConsoleConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.base_url())?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> GuardedClient<T> {
    /// Creates a client over an arbitrary transport.
    pub fn new(transport: T, config: ConsoleConfig) -> Self {
        Self {
            transport,
            config,
            sanitizer: CommandSanitizer::default(),
        }
    }

    /// Replaces the command sanitizer.
    pub fn with_sanitizer(mut self, sanitizer: CommandSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issues one request bounded by a deadline and normalizes the result.
    ///
    /// `timeout` overrides the configured deadline for this call only. A 2xx
    /// response whose body is a well-formed envelope with a recognised status
    /// and a payload that decodes as `P` is returned verbatim, including a
    /// backend-declared `BLOCKED`. Every other termination goes through
    /// [`normalize`]. The deadline is released before this returns.
    pub async fn guarded_call<P>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        options: RequestOptions,
        timeout: Option<Duration>,
    ) -> Outcome<P>
    where
        P: DeserializeOwned,
    {
        let span = tracing::debug_span!("guarded_call", endpoint, method = %method);

        async move {
            let deadline = Deadline::start(timeout.unwrap_or_else(|| self.config.timeout()));
            let request = TransportRequest {
                method,
                path: endpoint.to_string(),
                query: options.query,
                api_key: self.request_key(options.authenticated),
                body: options.body,
                cancel: deadline.token(),
            };

            let result = tokio::select! {
                result = self.transport.send(request) => result,
                () = deadline.expired() => Err(TransportError::Cancelled),
            };

            let ctx = AttemptContext::new(endpoint, method).with_deadline(deadline.duration());
            deadline.release();

            let outcome = match result {
                Ok(response) => interpret(ctx, response),
                Err(TransportError::Cancelled) => normalize(&ctx.timed_out()),
                Err(TransportError::Unreachable(detail)) => {
                    normalize(&ctx.with_error(detail).unreachable())
                }
                Err(err) => normalize(&ctx.with_error(err.to_string())),
            };

            log_outcome(&outcome);
            outcome
        }
        .instrument(span)
        .await
    }

    /// Validates `command` locally, then posts it to `/api/execute`.
    ///
    /// A command that is empty or not made of upper-case letters and
    /// underscores is blocked with `VALIDATION_FAILED` without touching the
    /// transport.
    pub async fn execute_command(
        &self,
        command: impl Into<Tainted<String>>,
        session_id: Option<&str>,
    ) -> ExecuteOutcome {
        let command = match self.sanitizer.sanitize(command.into()) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(
                    endpoint = EXECUTE_ENDPOINT,
                    kind = %err.kind(),
                    "command rejected before dispatch"
                );
                let outcome: Outcome<()> =
                    Outcome::blocked(EXECUTE_ENDPOINT, ReasonCode::ValidationFailed, err.message(), 0);
                return outcome.into();
            }
        };

        let mut body = json!({ "command": command.into_inner() });
        if let Some(session_id) = session_id {
            body["session_id"] = json!(session_id);
        }

        let options = RequestOptions::new().authenticated().json(body);
        self.guarded_call::<Value>(EXECUTE_ENDPOINT, HttpMethod::Post, options, None)
            .await
            .into()
    }

    /// Fetches audit records, trying the diagnostics surface if the audit
    /// endpoint is blocked.
    ///
    /// Returns an empty sequence when both are blocked. An empty result
    /// therefore means either "no records" or "no source answered"; callers
    /// render both as an empty audit log.
    pub async fn fetch_audit_log(&self, query: &AuditQuery) -> Vec<AuditRecord> {
        let options = RequestOptions::new()
            .authenticated()
            .query("filter", query.filter.as_str())
            .query("limit", query.limit.to_string());
        let primary: Outcome<Vec<AuditRecord>> = self
            .guarded_call(AUDIT_ENDPOINT, HttpMethod::Get, options, None)
            .await;
        if !primary.is_blocked() {
            return primary.into_data().unwrap_or_default();
        }

        tracing::info!(trace_id = %primary.trace_id, "audit endpoint blocked, trying fallback");
        let fallback: Outcome<Vec<AuditRecord>> = self
            .guarded_call(
                AUDIT_FALLBACK_ENDPOINT,
                HttpMethod::Get,
                RequestOptions::new().authenticated(),
                None,
            )
            .await;
        if fallback.is_blocked() {
            tracing::info!(trace_id = %fallback.trace_id, "audit fallback blocked, returning no records");
            return Vec::new();
        }

        fallback.into_data().unwrap_or_default()
    }

    /// Fetches the memory snapshot, or `None` when blocked or empty-handed.
    pub async fn fetch_memory_snapshot(&self) -> Option<MemorySnapshot> {
        let outcome: Outcome<MemorySnapshot> = self
            .guarded_call(
                MEMORY_ENDPOINT,
                HttpMethod::Get,
                RequestOptions::new().authenticated(),
                None,
            )
            .await;
        if outcome.is_blocked() {
            return None;
        }
        outcome.into_data()
    }

    fn request_key(&self, authenticated: bool) -> Option<Secret<String>> {
        if !authenticated {
            return None;
        }
        self.config
            .api_key()
            .map(|key| Secret::new(key.expose_secret().clone()))
    }
}

/// Turns a completed exchange into an outcome.
fn interpret<P: DeserializeOwned>(ctx: AttemptContext, response: TransportResponse) -> Outcome<P> {
    let ctx = ctx.with_http_status(response.status);
    let body = parse_body(&response.body);

    if !response.is_success() {
        return match body {
            Some(body) => normalize(&ctx.with_body(body)),
            None => normalize(&ctx),
        };
    }

    // An empty 2xx body is still a body, and not a valid one.
    let body = body.unwrap_or(Value::Null);
    if is_valid_response(&body) && has_recognized_status(&body) {
        return match serde_json::from_value::<Outcome<P>>(body.clone()) {
            Ok(outcome) => outcome,
            Err(err) => normalize(&ctx.with_body(body).with_payload_error(err.to_string())),
        };
    }
    normalize(&ctx.with_body(body))
}

/// Parses a response body. Non-JSON text is kept as a string value so it
/// still counts as a present, malformed body.
fn parse_body(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

fn log_outcome<P>(outcome: &Outcome<P>) {
    if outcome.is_blocked() {
        tracing::warn!(
            trace_id = %outcome.trace_id,
            reason = ?outcome.reason_codes,
            http_status = outcome.http_status.unwrap_or(0),
            "guarded call blocked"
        );
    } else {
        tracing::debug!(
            trace_id = %outcome.trace_id,
            status = %outcome.status,
            "guarded call passed through"
        );
    }
}
