//! In-process stand-in for a remote debugging endpoint.
//!
//! One axum server serves both `GET /json/list` and the per-target
//! WebSocket sessions at `/devtools/page/{id}`. Every incoming command is
//! recorded and answered by a scripted responder, which can delay, stay
//! silent, fail, emit events or drop the connection.

use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State as AxumState, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A target advertised by the fake endpoint.
#[derive(Debug, Clone)]
pub struct FakeTarget {
    pub id: String,
    pub target_type: String,
    pub url: String,
}

impl FakeTarget {
    /// A `page` target.
    pub fn page(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            target_type: "page".to_string(),
            url: url.to_string(),
        }
    }
}

/// A command received on one of the target sockets.
#[derive(Debug, Clone)]
pub struct Request {
    pub target_id: String,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

/// One scripted reaction to a request, played in order.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Respond successfully with this `result`.
    Result(Value),
    /// Respond with a protocol error.
    Error { code: i64, message: String },
    /// Emit an event.
    Event { method: String, params: Value },
    /// Sleep before playing the next reaction.
    Pause(Duration),
    /// Close the socket.
    Close,
}

impl Outbound {
    /// `Runtime.evaluate` result carrying `value`.
    pub fn evaluated(value: Value) -> Self {
        Outbound::Result(json!({"result": {"type": "object", "value": value}}))
    }

    /// `Runtime.evaluate` result for a thrown exception.
    pub fn thrown(description: &str) -> Self {
        Outbound::Result(json!({
            "result": {"type": "object", "subtype": "error"},
            "exceptionDetails": {
                "text": "Uncaught",
                "exception": {"type": "object", "subtype": "error", "description": description}
            }
        }))
    }
}

type Responder = Arc<dyn Fn(&Request) -> Vec<Outbound> + Send + Sync>;

struct State {
    port: u16,
    targets: Mutex<Vec<FakeTarget>>,
    refused: Mutex<HashSet<String>>,
    requests: Mutex<Vec<Request>>,
    list_hits: AtomicUsize,
    responder: Responder,
}

/// Default behaviour: enable calls succeed, navigation succeeds and fires
/// `Page.loadEventFired`, evaluation returns `undefined`.
pub fn default_reply(request: &Request) -> Vec<Outbound> {
    match request.method.as_str() {
        "Page.navigate" => vec![
            Outbound::Result(json!({"frameId": "main"})),
            Outbound::Event {
                method: "Page.loadEventFired".to_string(),
                params: json!({"timestamp": 1.0}),
            },
        ],
        "Runtime.evaluate" => vec![Outbound::Result(json!({"result": {"type": "undefined"}}))],
        _ => vec![Outbound::Result(json!({}))],
    }
}

/// Fake debugging endpoint bound to an ephemeral local port.
pub struct FakeDebugger {
    state: Arc<State>,
    task: JoinHandle<()>,
}

impl FakeDebugger {
    /// Start with the default responder.
    pub async fn start(targets: Vec<FakeTarget>) -> io::Result<Self> {
        Self::with_responder(targets, default_reply).await
    }

    /// Start with a custom responder.
    pub async fn with_responder<F>(targets: Vec<FakeTarget>, responder: F) -> io::Result<Self>
    where
        F: Fn(&Request) -> Vec<Outbound> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let state = Arc::new(State {
            port,
            targets: Mutex::new(targets),
            refused: Mutex::new(HashSet::new()),
            requests: Mutex::new(Vec::new()),
            list_hits: AtomicUsize::new(0),
            responder: Arc::new(responder),
        });

        let app = Router::new()
            .route("/json/list", get(list_targets))
            .route("/devtools/page/{id}", get(upgrade_target))
            .with_state(state.clone());
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { state, task })
    }

    /// Port the endpoint listens on.
    pub fn port(&self) -> u16 {
        self.state.port
    }

    /// Replace the advertised target list.
    pub fn set_targets(&self, targets: Vec<FakeTarget>) {
        *self.state.targets.lock() = targets;
    }

    /// Reject WebSocket upgrades for `target_id`.
    pub fn refuse(&self, target_id: &str) {
        self.state.refused.lock().insert(target_id.to_string());
    }

    /// Every command received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.state.requests.lock().clone()
    }

    /// Commands named `method`.
    pub fn requests_for(&self, method: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    /// Number of `/json/list` requests served.
    pub fn list_hits(&self) -> usize {
        self.state.list_hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeDebugger {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn list_targets(AxumState(state): AxumState<Arc<State>>) -> Json<Value> {
    state.list_hits.fetch_add(1, Ordering::SeqCst);
    let targets = state
        .targets
        .lock()
        .iter()
        .map(|t| {
            json!({
                "id": t.id,
                "type": t.target_type,
                "url": t.url,
                "title": "",
                "webSocketDebuggerUrl": format!("ws://127.0.0.1:{}/devtools/page/{}", state.port, t.id),
            })
        })
        .collect();
    Json(Value::Array(targets))
}

async fn upgrade_target(
    Path(target_id): Path<String>,
    ws: WebSocketUpgrade,
    AxumState(state): AxumState<Arc<State>>,
) -> Response {
    if state.refused.lock().contains(&target_id) {
        return (StatusCode::FORBIDDEN, "target refused").into_response();
    }
    ws.on_upgrade(move |socket| serve_target(socket, state, target_id))
}

async fn serve_target(socket: WebSocket, state: Arc<State>, target_id: String) {
    let (sink, mut source) = socket.split();
    let sink = Arc::new(tokio::sync::Mutex::new(sink));

    while let Some(Ok(message)) = source.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let Ok(frame) = serde_json::from_str::<Value>(text.as_str()) else {
            continue;
        };
        let request = Request {
            target_id: target_id.clone(),
            id: frame["id"].as_u64().unwrap_or_default(),
            method: frame["method"].as_str().unwrap_or_default().to_string(),
            params: frame.get("params").cloned().unwrap_or(Value::Null),
        };
        state.requests.lock().push(request.clone());

        let replies = (state.responder)(&request);
        let sink = sink.clone();
        tokio::spawn(async move {
            for reply in replies {
                let frame = match reply {
                    Outbound::Pause(delay) => {
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    Outbound::Close => {
                        let _ = sink.lock().await.send(Message::Close(None)).await;
                        return;
                    }
                    Outbound::Result(result) => json!({"id": request.id, "result": result}),
                    Outbound::Error { code, message } => {
                        json!({"id": request.id, "error": {"code": code, "message": message}})
                    }
                    Outbound::Event { method, params } => json!({"method": method, "params": params}),
                };
                if sink
                    .lock()
                    .await
                    .send(Message::Text(frame.to_string().into()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        });
    }
}
