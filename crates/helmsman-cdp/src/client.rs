//! CDP WebSocket client bound to a single target.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use crate::discovery::{DEFAULT_HOST, discover_targets};
use crate::error::CdpError;
use crate::protocol::{CdpMessage, CdpRequest, ExceptionDetails};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;
type WaiterMap = Arc<Mutex<HashMap<String, Vec<oneshot::Sender<Value>>>>>;

/// Upper bound on sending the close frame during disconnect.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Connection options shared by every client of one remote instance.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Host serving the debugging endpoint.
    pub host: String,
    /// Debugging port.
    pub port: u16,
    /// Default per-call timeout.
    pub timeout: Duration,
    /// Use the `webSocketDebuggerUrl` advertised by discovery instead of
    /// building the socket URL from `host` and `port`.
    pub remote: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 9222,
            timeout: Duration::from_secs(30),
            remote: false,
        }
    }
}

impl ClientOptions {
    /// Options for `port` on the default host.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Socket URL for `target_id` built from the configured host.
    pub fn local_ws_url(&self, target_id: &str) -> String {
        format!("ws://{}:{}/devtools/page/{}", self.host, self.port, target_id)
    }
}

/// A one-shot subscription to a named protocol event.
///
/// Register it before issuing the command that triggers the event, then
/// `wait()` on it.
pub struct EventWaiter {
    event: String,
    rx: Option<oneshot::Receiver<Value>>,
    timeout: Duration,
}

impl EventWaiter {
    /// Name of the awaited event.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Suspend until the event arrives or the client timeout elapses.
    pub async fn wait(self) -> Result<Value, CdpError> {
        let Some(rx) = self.rx else {
            return Err(CdpError::NotConnected);
        };
        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(params)) => Ok(params),
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => Err(CdpError::Timeout {
                method: self.event,
                after: self.timeout,
            }),
        }
    }
}

/// Protocol client owning one WebSocket connection to one target.
///
/// Responses are matched to callers by correlation id, so concurrent calls
/// complete independently of each other.
pub struct CdpClient {
    target_id: String,
    timeout: Duration,
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: PendingMap,
    waiters: WaiterMap,
    connected: Arc<AtomicBool>,
    recv_task: Mutex<Option<JoinHandle<()>>>,
}

impl CdpClient {
    /// Connect to `target_id` on the endpoint described by `options`.
    ///
    /// The target must be listed by discovery. The returned client stays bound
    /// to that target; talking to another target needs a new client.
    pub async fn connect(options: &ClientOptions, target_id: &str) -> Result<Self, CdpError> {
        let targets = discover_targets(options.port, &options.host).await?;
        let target = targets
            .iter()
            .find(|t| t.id == target_id)
            .ok_or_else(|| CdpError::TargetNotFound(target_id.to_string()))?;

        let ws_url = match (&target.web_socket_debugger_url, options.remote) {
            (Some(advertised), true) => advertised.clone(),
            _ => options.local_ws_url(target_id),
        };
        debug!("Connecting to target {} at {}", target_id, ws_url);

        let connecting = tokio_tungstenite::connect_async(ws_url.as_str());
        let (ws_stream, _) = tokio::time::timeout(options.timeout, connecting)
            .await
            .map_err(|_| CdpError::Timeout {
                method: "connect".to_string(),
                after: options.timeout,
            })?
            .map_err(|e| CdpError::Connection {
                port: options.port,
                message: format!("WebSocket to target {}: {}", target_id, e),
            })?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let waiters: WaiterMap = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(true));

        let recv_task = {
            let pending = pending.clone();
            let waiters = waiters.clone();
            let connected = connected.clone();
            let target_id = target_id.to_string();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending, waiters).await;
                connected.store(false, Ordering::SeqCst);
                debug!("Receive loop for target {} ended", target_id);
            })
        };

        info!("Connected to target {} on port {}", target_id, options.port);

        Ok(Self {
            target_id: target_id.to_string(),
            timeout: options.timeout,
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            request_id: AtomicU64::new(1),
            pending,
            waiters,
            connected,
            recv_task: Mutex::new(Some(recv_task)),
        })
    }

    /// WebSocket receive loop. Dropping the pending senders on exit fails
    /// every in-flight call with `SessionClosed`.
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap, waiters: WaiterMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpMessage>(&text) {
                        Ok(message) => Self::dispatch(message, &pending, &waiters),
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed by remote");
                    break;
                }
                Err(e) => {
                    warn!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        pending.lock().clear();
        waiters.lock().clear();
    }

    fn dispatch(message: CdpMessage, pending: &PendingMap, waiters: &WaiterMap) {
        if let Some(id) = message.id {
            let Some(tx) = pending.lock().remove(&id) else {
                debug!("Dropping response for unknown request {}", id);
                return;
            };
            let result = match message.error {
                Some(error) => Err(CdpError::Protocol {
                    code: error.code,
                    message: error.message,
                }),
                None => Ok(message.result.unwrap_or(Value::Null)),
            };
            let _ = tx.send(result);
        } else if let Some(method) = message.method {
            let listeners = waiters.lock().remove(&method);
            if let Some(listeners) = listeners {
                let params = message.params.unwrap_or(Value::Null);
                for tx in listeners {
                    let _ = tx.send(params.clone());
                }
            }
        }
    }

    /// Target this client is bound to.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Default per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the connection is still open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send a CDP command and wait for its response.
    pub async fn send(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.send_with_timeout(method, params, self.timeout).await
    }

    /// Send a CDP command with an explicit time budget.
    ///
    /// Expiry fails this call only; the connection and other pending calls
    /// are left untouched.
    pub async fn send_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<Value, CdpError> {
        if !self.is_connected() {
            return Err(CdpError::NotConnected);
        }

        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let json = serde_json::to_string(&CdpRequest { id, method, params })?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let exchange = async {
            let sent = self.ws_tx.lock().await.send(Message::Text(json.into())).await;
            if let Err(e) = sent {
                return Err(CdpError::from(e));
            }
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(CdpError::SessionClosed),
            }
        };
        let outcome = tokio::time::timeout(timeout, exchange).await;

        // No-op when the receive loop already completed the request.
        self.pending.lock().remove(&id);

        match outcome {
            Ok(result) => result,
            Err(_) => {
                debug!("{} (request {}) timed out after {:?}", method, id, timeout);
                Err(CdpError::Timeout {
                    method: method.to_string(),
                    after: timeout,
                })
            }
        }
    }

    /// Evaluate a JavaScript expression and return its value.
    ///
    /// With `await_result` a promise result is awaited remotely. A thrown
    /// exception surfaces as [`CdpError::Evaluation`].
    pub async fn evaluate(&self, expression: &str, await_result: bool) -> Result<Value, CdpError> {
        self.evaluate_with_timeout(expression, await_result, self.timeout)
            .await
    }

    /// [`evaluate`](Self::evaluate) with an explicit time budget.
    pub async fn evaluate_with_timeout(
        &self,
        expression: &str,
        await_result: bool,
        timeout: Duration,
    ) -> Result<Value, CdpError> {
        let result = self
            .send_with_timeout(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": await_result,
                })),
                timeout,
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let message = serde_json::from_value::<ExceptionDetails>(exception.clone())
                .map(|details| details.message())
                .unwrap_or_else(|_| exception.to_string());
            return Err(CdpError::Evaluation(message));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Navigate the target to `url` and return the frame id.
    ///
    /// Only `http` and `https` URLs are accepted; anything else is refused
    /// before a frame is sent.
    pub async fn navigate(&self, url: &str) -> Result<String, CdpError> {
        let parsed = url::Url::parse(url).map_err(|e| CdpError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CdpError::InvalidUrl {
                url: url.to_string(),
                reason: format!("scheme '{}' is not allowed", parsed.scheme()),
            });
        }

        let result = self.send("Page.navigate", Some(json!({"url": url}))).await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            return Err(CdpError::NavigationFailed(error.to_string()));
        }

        debug!("Navigated target {} to {}", self.target_id, url);
        Ok(result["frameId"].as_str().unwrap_or("main").to_string())
    }

    /// Register a one-shot waiter for `event`.
    pub fn event_waiter(&self, event: &str) -> EventWaiter {
        let rx = if self.is_connected() {
            let (tx, rx) = oneshot::channel();
            let mut waiters = self.waiters.lock();
            let listeners = waiters.entry(event.to_string()).or_default();
            listeners.retain(|tx| !tx.is_closed());
            listeners.push(tx);
            Some(rx)
        } else {
            None
        };

        EventWaiter {
            event: event.to_string(),
            rx,
            timeout: self.timeout,
        }
    }

    /// Wait for the next occurrence of `event` and return its params.
    pub async fn wait_for_event(&self, event: &str) -> Result<Value, CdpError> {
        self.event_waiter(event).wait().await
    }

    /// Close the connection. Safe to call more than once.
    pub async fn disconnect(&self) {
        let was_connected = self.connected.swap(false, Ordering::SeqCst);

        let task = self.recv_task.lock().take();
        if let Some(task) = task {
            task.abort();
        }
        self.pending.lock().clear();
        self.waiters.lock().clear();

        if was_connected {
            let mut ws = self.ws_tx.lock().await;
            match tokio::time::timeout(CLOSE_TIMEOUT, ws.close()).await {
                Ok(Err(e)) => debug!("Close frame for target {} failed: {}", self.target_id, e),
                Err(_) => debug!("Close frame for target {} timed out", self.target_id),
                Ok(Ok(())) => {}
            }
            info!("Disconnected from target {}", self.target_id);
        }
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        if let Some(task) = self.recv_task.get_mut().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
