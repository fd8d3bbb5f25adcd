//! Guarded client walkthrough against a canned in-memory backend.
//!
//! Shows how every kind of backend behaviour, good or bad, comes back as a
//! typed outcome: approved commands, local rejections, auth failures,
//! malformed bodies, the audit fallback and a hung backend hitting its
//! deadline.
//!
//! Run with: `cargo run --example guarded_client`

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use console_guard::{
    AuditQuery, ConsoleConfig, GuardedClient, HttpMethod, Outcome, RequestOptions, Transport,
    TransportError, TransportRequest, TransportResponse, AUDIT_ENDPOINT, AUDIT_FALLBACK_ENDPOINT,
    EXECUTE_ENDPOINT, MEMORY_ENDPOINT,
};
use serde_json::json;

/// Answers each path with a fixed status and body. `None` never answers.
#[derive(Debug, Default)]
struct CannedBackend {
    replies: HashMap<&'static str, Option<(u16, String)>>,
}

impl CannedBackend {
    fn reply(mut self, path: &'static str, status: u16, body: impl Into<String>) -> Self {
        self.replies.insert(path, Some((status, body.into())));
        self
    }

    fn hang(mut self, path: &'static str) -> Self {
        self.replies.insert(path, None);
        self
    }
}

#[async_trait]
impl Transport for CannedBackend {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        match self.replies.get(request.path.as_str()) {
            Some(Some((status, body))) => Ok(TransportResponse::new(*status, body.clone())),
            Some(None) => {
                request.cancel.cancelled().await;
                Err(TransportError::Cancelled)
            }
            None => Err(TransportError::Unreachable("connection refused".to_string())),
        }
    }
}

fn describe(outcome: &Outcome) -> String {
    format!(
        "{} trace={} reasons={:?} http={:?} message={:?}",
        outcome.status, outcome.trace_id, outcome.reason_codes, outcome.http_status, outcome.message
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== Guarded Client Example ===\n");

    let backend = CannedBackend::default()
        .reply(
            EXECUTE_ENDPOINT,
            200,
            json!({
                "status": "APPROVED",
                "ts_utc": "2026-01-01T00:00:00Z",
                "trace_id": "exec-42"
            })
            .to_string(),
        )
        .reply(AUDIT_ENDPOINT, 503, "Service Unavailable")
        .reply(
            AUDIT_FALLBACK_ENDPOINT,
            200,
            json!({
                "status": "NEUTRAL",
                "ts_utc": "2026-01-01T00:00:00Z",
                "trace_id": "metrics-1",
                "data": [{"decision": "ALLOW", "trace_id": "rec-1", "event_type": "execute"}]
            })
            .to_string(),
        )
        .reply(MEMORY_ENDPOINT, 200, "<html>maintenance</html>")
        .hang("/api/slow");

    let config = ConsoleConfig::new("http://console.local").with_api_key("sk-demo-key");
    println!("Config: {:?}", config);
    println!("Notice: the API key is shown as [REDACTED]\n");

    let client = GuardedClient::new(backend, config);

    println!("--- Scenario 1: Approved Command ---");
    let outcome = client.execute_command("RUN_DIAGNOSTIC", Some("session-1")).await;
    println!("{} trace={}", outcome.status, outcome.trace_id);

    println!("\n--- Scenario 2: Command Rejected Locally ---");
    let outcome = client.execute_command("rm -rf /", None).await;
    println!("{} trace={} reasons={:?}", outcome.status, outcome.trace_id, outcome.reason_codes);
    println!("No request reached the backend");

    println!("\n--- Scenario 3: Audit Log With Fallback ---");
    let records = client.fetch_audit_log(&AuditQuery::new("denied", 10)).await;
    println!("Primary answered 503; fallback returned {} record(s)", records.len());
    for record in &records {
        println!("  - {:?} {:?}", record.decision, record.trace_id);
    }

    println!("\n--- Scenario 4: Malformed Memory Snapshot ---");
    let snapshot = client.fetch_memory_snapshot().await;
    println!("Snapshot: {:?}", snapshot);

    println!("\n--- Scenario 5: Hung Backend ---");
    let outcome: Outcome = client
        .guarded_call(
            "/api/slow",
            HttpMethod::Get,
            RequestOptions::new().authenticated(),
            Some(Duration::from_millis(200)),
        )
        .await;
    println!("{}", describe(&outcome));

    println!("\n--- Scenario 6: Unknown Endpoint ---");
    let outcome: Outcome = client
        .guarded_call("/api/missing", HttpMethod::Get, RequestOptions::new(), None)
        .await;
    println!("{}", describe(&outcome));

    println!("\n=== Key Takeaways ===");
    println!("1. Every call returns a value; nothing is thrown");
    println!("2. Anything ambiguous becomes BLOCKED with a reason code");
    println!("3. Blocked outcomes carry a deterministic trace id");
}
