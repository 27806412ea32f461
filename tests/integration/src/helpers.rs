//! Test helpers for integration tests
//!
//! `FakeGateway` accepts relay sockets and hands each one to the test as a
//! `FakeSocket` it can script frame by frame. `WebhookSink` records every
//! webhook POST.

use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

/// Default wait for anything a test expects to happen
pub const WAIT: Duration = Duration::from_secs(5);

/// Await `future`, failing after [`WAIT`]
pub async fn within<F: std::future::Future>(future: F) -> Result<F::Output> {
    tokio::time::timeout(WAIT, future)
        .await
        .map_err(|_| anyhow!("timed out after {WAIT:?}"))
}

async fn serve(router: Router) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    Ok((addr, handle))
}

// ============================================================================
// Fake gateway
// ============================================================================

enum Command {
    Frame(Value),
    Close(u16),
}

/// Server side of one relay socket
pub struct FakeSocket {
    commands: mpsc::UnboundedSender<Command>,
    inbound: mpsc::UnboundedReceiver<Value>,
}

impl FakeSocket {
    /// Send a frame to the relay
    pub fn send(&self, frame: Value) -> Result<()> {
        self.commands
            .send(Command::Frame(frame))
            .map_err(|_| anyhow!("socket already closed"))
    }

    /// Send Hello with the given heartbeat interval
    pub fn hello(&self, heartbeat_interval: u64) -> Result<()> {
        self.send(json!({"op": 10, "d": {"heartbeat_interval": heartbeat_interval}}))
    }

    /// Send a dispatch frame
    pub fn dispatch(&self, event_type: &str, seq: u64, data: Value) -> Result<()> {
        self.send(json!({"op": 0, "t": event_type, "s": seq, "d": data}))
    }

    /// Close the socket with a close frame
    pub fn close(&self, code: u16) -> Result<()> {
        self.commands
            .send(Command::Close(code))
            .map_err(|_| anyhow!("socket already closed"))
    }

    /// Next frame from the relay; `None` once the relay dropped the socket
    pub async fn recv(&mut self) -> Result<Option<Value>> {
        within(self.inbound.recv()).await
    }

    /// Next frame from the relay with the given op, skipping any others
    pub async fn recv_op(&mut self, op: u64) -> Result<Value> {
        loop {
            let frame = self
                .recv()
                .await?
                .ok_or_else(|| anyhow!("socket closed while waiting for op {op}"))?;
            if frame["op"] == op {
                return Ok(frame);
            }
        }
    }

    /// Wait for the relay to drop the socket, skipping frames
    pub async fn closed(&mut self) -> Result<()> {
        while self.recv().await?.is_some() {}
        Ok(())
    }
}

#[derive(Clone)]
struct GatewayState {
    addr: SocketAddr,
    accepted: mpsc::UnboundedSender<FakeSocket>,
}

/// Scripted gateway serving discovery and the socket endpoint
pub struct FakeGateway {
    pub addr: SocketAddr,
    accepted: mpsc::UnboundedReceiver<FakeSocket>,
    _handle: JoinHandle<()>,
}

impl FakeGateway {
    /// Start a fake gateway on an ephemeral port
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let (tx, accepted) = mpsc::unbounded_channel();

        let state = GatewayState { addr, accepted: tx };
        let router = Router::new()
            .route("/api/gateway", get(discovery))
            .route("/ws", get(upgrade))
            .route("/ws/", get(upgrade))
            .with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Ok(Self {
            addr,
            accepted,
            _handle: handle,
        })
    }

    /// API base URL for discovery
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Socket URL the relay connects to
    pub fn socket_url(&self) -> String {
        relay_gateway::client::socket_url(&format!("ws://{}/ws", self.addr))
    }

    /// Wait for the relay's next connection
    pub async fn accept(&mut self) -> Result<FakeSocket> {
        within(self.accepted.recv())
            .await?
            .context("fake gateway stopped")
    }
}

async fn discovery(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({"url": format!("ws://{}/ws", state.addr)}))
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| drive_socket(socket, state))
}

async fn drive_socket(socket: WebSocket, state: GatewayState) {
    let (commands_tx, mut commands) = mpsc::unbounded_channel();
    let (inbound_tx, inbound) = mpsc::unbounded_channel();

    let fake = FakeSocket {
        commands: commands_tx,
        inbound,
    };
    if state.accepted.send(fake).is_err() {
        return;
    }

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Frame(frame)) => {
                    if sink.send(Message::Text(frame.to_string())).await.is_err() {
                        break;
                    }
                }
                Some(Command::Close(code)) => {
                    let frame = CloseFrame { code, reason: Cow::Borrowed("test close") };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                    break;
                }
                None => break,
            },
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(frame) = serde_json::from_str::<Value>(&text) {
                        let _ = inbound_tx.send(frame);
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

// ============================================================================
// Webhook sink
// ============================================================================

/// One recorded webhook POST
#[derive(Debug, Clone)]
pub struct Delivery {
    pub hook: String,
    pub body: Value,
}

#[derive(Clone, Default)]
struct SinkState {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    notify: Arc<Notify>,
}

/// HTTP server recording webhook POSTs at `/hooks/:name`
pub struct WebhookSink {
    pub addr: SocketAddr,
    state: SinkState,
    _handle: JoinHandle<()>,
}

impl WebhookSink {
    pub async fn start() -> Result<Self> {
        let state = SinkState::default();
        let router = Router::new()
            .route("/hooks/:name", post(record))
            .with_state(state.clone());
        let (addr, handle) = serve(router).await?;

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// URL for a named hook
    pub fn url(&self, hook: &str) -> String {
        format!("http://{}/hooks/{hook}", self.addr)
    }

    /// All deliveries so far
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.state.deliveries.lock().clone()
    }

    /// Deliveries for one hook
    pub fn bodies(&self, hook: &str) -> Vec<Value> {
        self.deliveries()
            .into_iter()
            .filter(|d| d.hook == hook)
            .map(|d| d.body)
            .collect()
    }

    /// Wait until `hook` has received at least `count` deliveries
    pub async fn wait_for(&self, hook: &str, count: usize) -> Result<Vec<Value>> {
        within(async {
            loop {
                let notified = self.state.notify.notified();
                let bodies = self.bodies(hook);
                if bodies.len() >= count {
                    return bodies;
                }
                notified.await;
            }
        })
        .await
        .with_context(|| format!("waiting for {count} '{hook}' deliveries"))
    }
}

async fn record(
    State(state): State<SinkState>,
    Path(hook): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.deliveries.lock().push(Delivery { hook, body });
    state.notify.notify_waiters();
    axum::http::StatusCode::NO_CONTENT
}
