//! Scripted in-memory transport for exercising `GuardedClient` offline.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use console_guard::{
    ConsoleConfig, GuardedClient, HttpMethod, Transport, TransportError, TransportRequest,
    TransportResponse,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// What the fake backend does for one path.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer immediately with a status and raw body
    Respond(u16, String),
    /// Answer with a status and body after a delay
    Delayed(Duration, u16, String),
    /// Fail before any response
    Fault(TransportError),
    /// Never answer and ignore cancellation
    Hang,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self::Respond(status, body.to_string())
    }
}

/// A request as the fake backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub api_key: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn tokens(&self) -> Vec<CancellationToken> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method,
            path: request.path.clone(),
            query: request.query.clone(),
            api_key: request
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().clone()),
            body: request.body.clone(),
        });
        self.tokens.lock().unwrap().push(request.cancel.clone());

        let reply = self
            .routes
            .lock()
            .unwrap()
            .get(&request.path)
            .cloned()
            .unwrap_or_else(|| Reply::Fault(TransportError::Unreachable("no route".to_string())));

        match reply {
            Reply::Respond(status, body) => Ok(TransportResponse::new(status, body)),
            Reply::Delayed(delay, status, body) => {
                tokio::time::sleep(delay).await;
                Ok(TransportResponse::new(status, body))
            }
            Reply::Fault(err) => Err(err),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub const TEST_KEY: &str = "sk-test-0123456789";

pub fn client(transport: ScriptedTransport) -> GuardedClient<ScriptedTransport> {
    let config = ConsoleConfig::new("http://console.test").with_api_key(TEST_KEY);
    GuardedClient::new(transport, config)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
