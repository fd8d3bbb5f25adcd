//! End-to-end behaviour of `GuardedClient` against a scripted backend.

mod common;

use std::time::Duration;

use common::{client, init_tracing, Reply, ScriptedTransport, TEST_KEY};
use console_guard::{
    AuditQuery, ConsoleConfig, ExecuteOutcome, GuardedClient, HttpMethod, Outcome, ReasonCode,
    RequestOptions, Status, TransportError, AUDIT_ENDPOINT, AUDIT_FALLBACK_ENDPOINT,
    EXECUTE_ENDPOINT, MEMORY_ENDPOINT,
};
use serde_json::json;

fn envelope(status: &str, trace_id: &str) -> serde_json::Value {
    json!({
        "status": status,
        "ts_utc": "2026-01-01T00:00:00Z",
        "trace_id": trace_id
    })
}

fn codes(outcome: &Outcome) -> Vec<String> {
    outcome.reason_codes.clone().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// execute_command
// ---------------------------------------------------------------------------

#[tokio::test]
async fn execute_command_passes_approved_response_through() {
    init_tracing();
    let client = client(
        ScriptedTransport::new().route(EXECUTE_ENDPOINT, Reply::json(200, envelope("APPROVED", "abc123"))),
    );

    let outcome = client
        .execute_command("RUN_DIAGNOSTIC", Some("session-7"))
        .await;

    assert_eq!(
        outcome,
        ExecuteOutcome {
            status: Status::Approved,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            trace_id: "abc123".to_string(),
            reason_codes: None,
        }
    );

    let calls = client.transport().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, HttpMethod::Post);
    assert_eq!(calls[0].path, EXECUTE_ENDPOINT);
    assert_eq!(calls[0].api_key.as_deref(), Some(TEST_KEY));
    assert_eq!(
        calls[0].body,
        Some(json!({"command": "RUN_DIAGNOSTIC", "session_id": "session-7"}))
    );
}

#[tokio::test]
async fn execute_command_omits_missing_session() {
    let client = client(
        ScriptedTransport::new().route(EXECUTE_ENDPOINT, Reply::json(200, envelope("APPROVED", "t"))),
    );

    client.execute_command("STATUS", None).await;

    let calls = client.transport().calls();
    assert_eq!(calls[0].body, Some(json!({"command": "STATUS"})));
}

#[tokio::test]
async fn execute_command_rejects_lowercase_without_network() {
    let client = client(
        ScriptedTransport::new().route(EXECUTE_ENDPOINT, Reply::json(200, envelope("APPROVED", "t"))),
    );

    let outcome = client.execute_command("run_diag", Some("session-7")).await;

    assert_eq!(outcome.status, Status::Blocked);
    assert!(outcome.has_reason(ReasonCode::ValidationFailed));
    assert_eq!(outcome.trace_id, "/api/execute-validation-failed");
    assert_eq!(client.transport().call_count(), 0);
}

#[tokio::test]
async fn execute_command_rejects_empty_without_network() {
    let client = client(ScriptedTransport::new());

    let outcome = client.execute_command("", None).await;

    assert_eq!(outcome.status, Status::Blocked);
    assert!(outcome.has_reason(ReasonCode::ValidationFailed));
    assert_eq!(client.transport().call_count(), 0);
}

#[tokio::test]
async fn execute_command_trusts_backend_block() {
    let mut body = envelope("BLOCKED", "gate-42");
    body["reason_codes"] = json!(["POLICY_DENY"]);
    let client = client(ScriptedTransport::new().route(EXECUTE_ENDPOINT, Reply::json(200, body)));

    let outcome = client.execute_command("DEPLOY", None).await;

    assert_eq!(outcome.status, Status::Blocked);
    assert_eq!(outcome.trace_id, "gate-42");
    assert_eq!(outcome.reason_codes, Some(vec!["POLICY_DENY".to_string()]));
}

#[tokio::test]
async fn execute_command_maps_auth_failure() {
    let client = client(
        ScriptedTransport::new().route(EXECUTE_ENDPOINT, Reply::json(401, json!({"detail": "Unauthorized"}))),
    );

    let outcome = client.execute_command("STATUS", None).await;

    assert_eq!(outcome.status, Status::Blocked);
    assert!(outcome.has_reason(ReasonCode::ApiKeyInvalid));
}

#[tokio::test]
async fn missing_api_key_sends_no_header() {
    let transport = ScriptedTransport::new().route(EXECUTE_ENDPOINT, Reply::json(403, json!({})));
    let client = GuardedClient::new(transport, ConsoleConfig::new("http://console.test"));

    let outcome = client.execute_command("STATUS", None).await;

    assert!(outcome.has_reason(ReasonCode::ApiKeyInvalid));
    assert_eq!(client.transport().calls()[0].api_key, None);
}

// ---------------------------------------------------------------------------
// guarded_call
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn hung_backend_times_out_at_fifteen_seconds() {
    let client = client(ScriptedTransport::new().route(EXECUTE_ENDPOINT, Reply::Hang));
    let started = tokio::time::Instant::now();

    let outcome: Outcome = client
        .guarded_call(EXECUTE_ENDPOINT, HttpMethod::Post, RequestOptions::new(), None)
        .await;

    assert_eq!(outcome.status, Status::Blocked);
    assert_eq!(codes(&outcome), vec!["TIMEOUT_EXCEEDED"]);
    assert_eq!(outcome.http_status, Some(0));
    assert_eq!(outcome.trace_id, "/api/execute-timeout");
    assert_eq!(outcome.message.as_deref(), Some("Request timeout (>15000ms)"));

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(15_000));
    assert!(elapsed < Duration::from_millis(15_100));
}

#[tokio::test(start_paused = true)]
async fn per_call_timeout_override_applies() {
    let client = client(ScriptedTransport::new().route(
        MEMORY_ENDPOINT,
        Reply::Delayed(Duration::from_secs(2), 200, envelope("APPROVED", "t").to_string()),
    ));

    let outcome: Outcome = client
        .guarded_call(
            MEMORY_ENDPOINT,
            HttpMethod::Get,
            RequestOptions::new(),
            Some(Duration::from_millis(500)),
        )
        .await;

    assert!(outcome.has_reason(ReasonCode::TimeoutExceeded));
    assert_eq!(outcome.message.as_deref(), Some("Request timeout (>500ms)"));
}

#[tokio::test(start_paused = true)]
async fn slow_response_within_deadline_is_accepted() {
    let client = client(ScriptedTransport::new().route(
        MEMORY_ENDPOINT,
        Reply::Delayed(Duration::from_secs(14), 200, envelope("WARNING", "slow").to_string()),
    ));

    let outcome: Outcome = client
        .guarded_call(MEMORY_ENDPOINT, HttpMethod::Get, RequestOptions::new(), None)
        .await;

    assert_eq!(outcome.status, Status::Warning);
    assert_eq!(outcome.trace_id, "slow");
}

#[tokio::test]
async fn transport_cancellation_counts_as_timeout() {
    let client = client(
        ScriptedTransport::new().route(MEMORY_ENDPOINT, Reply::Fault(TransportError::Cancelled)),
    );

    let outcome: Outcome = client
        .guarded_call(MEMORY_ENDPOINT, HttpMethod::Get, RequestOptions::new(), None)
        .await;

    assert_eq!(codes(&outcome), vec!["TIMEOUT_EXCEEDED"]);
}

#[tokio::test]
async fn connection_failure_is_network_unreachable() {
    let client = client(ScriptedTransport::new().route(
        MEMORY_ENDPOINT,
        Reply::Fault(TransportError::Unreachable("connection refused".to_string())),
    ));

    let outcome: Outcome = client
        .guarded_call(MEMORY_ENDPOINT, HttpMethod::Get, RequestOptions::new(), None)
        .await;

    assert_eq!(codes(&outcome), vec!["NETWORK_UNREACHABLE"]);
    assert_eq!(outcome.http_status, Some(0));
    assert_eq!(outcome.trace_id, "/api/memory-network-error");
}

#[tokio::test]
async fn other_transport_fault_is_unknown_error_with_text() {
    let client = client(ScriptedTransport::new().route(
        MEMORY_ENDPOINT,
        Reply::Fault(TransportError::Other("body stream reset".to_string())),
    ));

    let outcome: Outcome = client
        .guarded_call(MEMORY_ENDPOINT, HttpMethod::Get, RequestOptions::new(), None)
        .await;

    assert_eq!(codes(&outcome), vec!["UNKNOWN_ERROR"]);
    assert!(outcome.message.unwrap().contains("body stream reset"));
}

#[tokio::test]
async fn malformed_ok_body_is_blocked_with_status_200() {
    let client = client(
        ScriptedTransport::new().route(EXECUTE_ENDPOINT, Reply::json(200, json!({"foo": "bar"}))),
    );

    let outcome: Outcome = client
        .guarded_call(EXECUTE_ENDPOINT, HttpMethod::Post, RequestOptions::new(), None)
        .await;

    assert_eq!(outcome.status, Status::Blocked);
    assert_eq!(codes(&outcome), vec!["MALFORMED_RESPONSE"]);
    assert_eq!(outcome.http_status, Some(200));
}

#[tokio::test]
async fn server_error_is_blocked() {
    let client = client(
        ScriptedTransport::new().route(MEMORY_ENDPOINT, Reply::Respond(502, "Bad Gateway".to_string())),
    );

    let outcome: Outcome = client
        .guarded_call(MEMORY_ENDPOINT, HttpMethod::Get, RequestOptions::new(), None)
        .await;

    assert_eq!(codes(&outcome), vec!["SERVER_ERROR"]);
    assert_eq!(outcome.http_status, Some(502));
    assert_eq!(outcome.trace_id, "/api/memory-server-error");
}

#[tokio::test]
async fn not_found_html_page_is_malformed_with_404() {
    let client = client(ScriptedTransport::new().route(
        MEMORY_ENDPOINT,
        Reply::Respond(404, "<html><body>Not Found</body></html>".to_string()),
    ));

    let outcome: Outcome = client
        .guarded_call(MEMORY_ENDPOINT, HttpMethod::Get, RequestOptions::new(), None)
        .await;

    assert_eq!(outcome.status, Status::Blocked);
    assert_eq!(codes(&outcome), vec!["MALFORMED_RESPONSE"]);
    assert_eq!(outcome.http_status, Some(404));
    assert_eq!(outcome.trace_id, "/api/memory-malformed-response");
}

#[tokio::test]
async fn backend_bad_request_is_traced_as_bad_request() {
    let client = client(ScriptedTransport::new().route(
        EXECUTE_ENDPOINT,
        Reply::json(400, json!({"detail": "command field missing"})),
    ));

    let outcome = client.execute_command("RUN_DIAGNOSTIC", None).await;

    assert_eq!(outcome.status, Status::Blocked);
    assert!(outcome.has_reason(ReasonCode::ValidationFailed));
    assert_eq!(outcome.trace_id, "/api/execute-bad-request");
}

#[tokio::test(start_paused = true)]
async fn deadline_timer_is_released_after_every_path() {
    let transport = ScriptedTransport::new()
        .route(EXECUTE_ENDPOINT, Reply::json(200, envelope("APPROVED", "ok")))
        .route(MEMORY_ENDPOINT, Reply::Respond(500, String::new()))
        .route(
            AUDIT_ENDPOINT,
            Reply::Fault(TransportError::Unreachable("refused".to_string())),
        );
    let client = client(transport);

    for endpoint in [EXECUTE_ENDPOINT, MEMORY_ENDPOINT, AUDIT_ENDPOINT] {
        let _: Outcome = client
            .guarded_call(endpoint, HttpMethod::Get, RequestOptions::new(), None)
            .await;
    }

    tokio::time::advance(Duration::from_secs(60)).await;
    tokio::task::yield_now().await;

    let tokens = client.transport().tokens();
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|token| !token.is_cancelled()));
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_are_independent() {
    let client = client(
        ScriptedTransport::new()
            .route(EXECUTE_ENDPOINT, Reply::Hang)
            .route(MEMORY_ENDPOINT, Reply::json(200, envelope("NEUTRAL", "mem"))),
    );

    let (hung, quick): (Outcome, Outcome) = tokio::join!(
        client.guarded_call(EXECUTE_ENDPOINT, HttpMethod::Post, RequestOptions::new(), None),
        client.guarded_call(MEMORY_ENDPOINT, HttpMethod::Get, RequestOptions::new(), None),
    );

    assert!(hung.has_reason(ReasonCode::TimeoutExceeded));
    assert_eq!(quick.status, Status::Neutral);
}

// ---------------------------------------------------------------------------
// fetch_audit_log
// ---------------------------------------------------------------------------

#[tokio::test]
async fn audit_log_returns_primary_records() {
    let mut body = envelope("APPROVED", "audit-1");
    body["data"] = json!([
        {"trace_id": "a", "decision": "ALLOW"},
        {"trace_id": "b", "decision": "DENY"}
    ]);
    let client = client(ScriptedTransport::new().route(AUDIT_ENDPOINT, Reply::json(200, body)));

    let records = client.fetch_audit_log(&AuditQuery::default()).await;

    assert_eq!(records.len(), 2);
    assert!(records[1].is_denied());

    let calls = client.transport().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].query,
        vec![
            ("filter".to_string(), "all".to_string()),
            ("limit".to_string(), "50".to_string())
        ]
    );
    assert_eq!(calls[0].api_key.as_deref(), Some(TEST_KEY));
}

#[tokio::test]
async fn audit_log_without_payload_is_empty() {
    let client = client(
        ScriptedTransport::new().route(AUDIT_ENDPOINT, Reply::json(200, envelope("APPROVED", "a"))),
    );

    let records = client.fetch_audit_log(&AuditQuery::new("deny", 10)).await;

    assert!(records.is_empty());
    assert_eq!(client.transport().call_count(), 1);
}

#[tokio::test]
async fn audit_log_uses_fallback_when_primary_blocked() {
    let mut fallback = envelope("APPROVED", "metrics-1");
    fallback["data"] = json!([{"metric": "gate_denials", "value": 3}]);
    let client = client(
        ScriptedTransport::new()
            .route(AUDIT_ENDPOINT, Reply::Respond(503, String::new()))
            .route(AUDIT_FALLBACK_ENDPOINT, Reply::json(200, fallback)),
    );

    let records = client.fetch_audit_log(&AuditQuery::default()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].extra.get("metric"), Some(&json!("gate_denials")));

    let paths: Vec<String> = client
        .transport()
        .calls()
        .into_iter()
        .map(|call| call.path)
        .collect();
    assert_eq!(paths, vec![AUDIT_ENDPOINT, AUDIT_FALLBACK_ENDPOINT]);
}

#[tokio::test]
async fn audit_log_backend_declared_block_triggers_fallback() {
    let client = client(
        ScriptedTransport::new()
            .route(AUDIT_ENDPOINT, Reply::json(200, envelope("BLOCKED", "deny")))
            .route(AUDIT_FALLBACK_ENDPOINT, Reply::json(200, envelope("APPROVED", "m"))),
    );

    let records = client.fetch_audit_log(&AuditQuery::default()).await;

    assert!(records.is_empty());
    assert_eq!(client.transport().call_count(), 2);
}

#[tokio::test]
async fn audit_log_is_empty_when_both_sources_blocked() {
    let client = client(
        ScriptedTransport::new()
            .route(AUDIT_ENDPOINT, Reply::json(200, envelope("BLOCKED", "a")))
            .route(AUDIT_FALLBACK_ENDPOINT, Reply::json(200, envelope("BLOCKED", "b"))),
    );

    let records = client.fetch_audit_log(&AuditQuery::default()).await;

    assert!(records.is_empty());
    assert_eq!(client.transport().call_count(), 2);
}

#[tokio::test]
async fn audit_log_is_empty_when_backend_unreachable() {
    let client = client(ScriptedTransport::new());

    let records = client.fetch_audit_log(&AuditQuery::default()).await;

    assert!(records.is_empty());
}

// ---------------------------------------------------------------------------
// fetch_memory_snapshot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn memory_snapshot_returns_payload() {
    let mut body = envelope("APPROVED", "mem-1");
    body["data"] = json!({"entries": 12, "scope": "session"});
    let client = client(ScriptedTransport::new().route(MEMORY_ENDPOINT, Reply::json(200, body)));

    let snapshot = client.fetch_memory_snapshot().await.expect("snapshot");

    assert_eq!(snapshot.get("entries"), Some(&json!(12)));
    assert_eq!(client.transport().calls()[0].method, HttpMethod::Get);
}

#[tokio::test]
async fn memory_snapshot_is_none_when_blocked() {
    let mut body = envelope("BLOCKED", "mem-2");
    body["data"] = json!({"entries": 12});
    let client = client(ScriptedTransport::new().route(MEMORY_ENDPOINT, Reply::json(200, body)));

    assert!(client.fetch_memory_snapshot().await.is_none());
}

#[tokio::test]
async fn memory_snapshot_is_none_without_payload() {
    let client = client(
        ScriptedTransport::new().route(MEMORY_ENDPOINT, Reply::json(200, envelope("APPROVED", "m"))),
    );

    assert!(client.fetch_memory_snapshot().await.is_none());
}

#[tokio::test]
async fn memory_snapshot_is_none_for_non_object_payload() {
    let mut body = envelope("APPROVED", "m");
    body["data"] = json!("not a record");
    let client = client(ScriptedTransport::new().route(MEMORY_ENDPOINT, Reply::json(200, body)));

    assert!(client.fetch_memory_snapshot().await.is_none());
}
