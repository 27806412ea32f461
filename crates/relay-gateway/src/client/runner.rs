//! Gateway client connect loop
//!
//! One task per bot owns the session, the live socket, and its heartbeat.
//! Inbound frames and heartbeat ticks are handled one at a time in that task;
//! a separate writer task owns the socket sink so writes never interleave.

use super::reconnect::ReconnectPolicy;
use crate::connection::{BotSession, Connection, ConnectionState};
use crate::handlers::{Disconnect, FrameDispatcher};
use crate::protocol::{CloseSeverity, GatewayMessage};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use relay_common::ReconnectConfig;
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound frames buffered between the session task and the writer
const OUTBOUND_BUFFER: usize = 32;

/// Why a socket stopped being served
#[derive(Debug)]
enum SocketEnd {
    /// Closed by the server, the network, or a handler; reconnect
    Closed(CloseReason),
    /// Process is shutting down
    Shutdown,
}

#[derive(Debug)]
enum CloseReason {
    Requested(Disconnect),
    ServerClose(Option<CloseFrame<'static>>),
    StreamEnded,
    Transport(String),
    WriterGone,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested(d) => write!(f, "{d}"),
            Self::ServerClose(Some(frame)) => {
                write!(f, "server closed with {} {}", u16::from(frame.code), frame.reason)
            }
            Self::ServerClose(None) => f.write_str("server closed"),
            Self::StreamEnded => f.write_str("stream ended"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::WriterGone => f.write_str("writer stopped"),
        }
    }
}

/// Long-running gateway session for one bot
pub struct GatewayClient {
    session: BotSession,
    url: String,
    policy: ReconnectPolicy,
    verbose: bool,
}

impl GatewayClient {
    /// Create a client for an already-discovered socket URL
    #[must_use]
    pub fn new(session: BotSession, url: impl Into<String>) -> Self {
        Self {
            session,
            url: url.into(),
            policy: ReconnectPolicy::from(&ReconnectConfig::default()),
            verbose: false,
        }
    }

    #[must_use]
    pub fn with_reconnect(mut self, config: &ReconnectConfig) -> Self {
        self.policy = ReconnectPolicy::from(config);
        self
    }

    /// Log every inbound frame at debug level
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn session(&self) -> &BotSession {
        &self.session
    }

    /// Connect and keep reconnecting until `shutdown` flips to true
    ///
    /// Returns the session so callers can inspect the final state.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> BotSession {
        self.session.load().await;

        loop {
            if *shutdown.borrow() {
                break;
            }

            tracing::debug!(url = %self.url, "Connecting to gateway");
            let connected = tokio::select! {
                _ = shutdown.changed() => break,
                result = connect_async(self.url.as_str()) => result,
            };

            let ws = match connected {
                Ok((ws, _response)) => ws,
                Err(e) => {
                    let delay = self.policy.after_failure();
                    tracing::warn!(
                        error = %e,
                        attempt = self.policy.failures(),
                        retry_in_ms = delay.as_millis() as u64,
                        "Gateway connect failed"
                    );
                    if wait_or_shutdown(delay, &mut shutdown).await {
                        break;
                    }
                    continue;
                }
            };

            self.policy.reset();
            tracing::info!("Gateway socket open");

            match self.serve(ws, &mut shutdown).await {
                SocketEnd::Shutdown => break,
                SocketEnd::Closed(reason) => {
                    tracing::info!(reason = %reason, "Gateway socket closed");
                    self.session.dispatcher().disconnected();

                    if wait_or_shutdown(self.policy.after_close(), &mut shutdown).await {
                        break;
                    }
                }
            }
        }

        self.session.persist().await;
        tracing::info!("Gateway client stopped");
        self.session
    }

    /// Serve one open socket until it closes
    ///
    /// The heartbeat is stopped and the writer aborted before returning, so
    /// the caller may reconnect right away.
    async fn serve(&mut self, ws: WsStream, shutdown: &mut watch::Receiver<bool>) -> SocketEnd {
        let (sink, mut stream) = ws.split();
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let writer = tokio::spawn(writer_task(sink, rx));

        let mut connection = Connection::new(tx);
        connection.set_state(ConnectionState::Connected);

        let end = loop {
            tokio::select! {
                _ = shutdown.changed() => break SocketEnd::Shutdown,

                () = connection.heartbeat_mut().tick() => {
                    let seq = self.session.state().seq;
                    tracing::trace!(seq = ?seq, "Sending heartbeat");
                    if connection.send_heartbeat(seq).await.is_err() {
                        break SocketEnd::Closed(CloseReason::WriterGone);
                    }
                }

                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reason) = self.on_text(&mut connection, &text).await {
                            break SocketEnd::Closed(reason);
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        log_close_frame(frame.as_ref());
                        break SocketEnd::Closed(CloseReason::ServerClose(frame));
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!(len = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break SocketEnd::Closed(CloseReason::Transport(e.to_string())),
                    None => break SocketEnd::Closed(CloseReason::StreamEnded),
                },
            }
        };

        connection.close();
        writer.abort();
        drop(stream);

        end
    }

    async fn on_text(&mut self, connection: &mut Connection, text: &str) -> Option<CloseReason> {
        let message = match GatewayMessage::from_json(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable frame");
                return None;
            }
        };

        if self.verbose {
            tracing::debug!(frame = %message, "Inbound frame");
        }

        match FrameDispatcher::dispatch(&mut self.session, connection, message).await {
            Ok(None) => None,
            Ok(Some(disconnect)) => Some(CloseReason::Requested(disconnect)),
            Err(e) if e.is_fatal_for_connection() => Some(CloseReason::WriterGone),
            Err(e) => {
                tracing::warn!(error = %e, "Frame handling failed");
                None
            }
        }
    }
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("session", &self.session)
            .field("url", &self.url)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Drain queued frames into the socket
async fn writer_task(
    mut sink: SplitSink<WsStream, Message>,
    mut rx: mpsc::Receiver<GatewayMessage>,
) {
    while let Some(message) = rx.recv().await {
        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode frame");
                continue;
            }
        };

        if let Err(e) = sink.send(Message::Text(text)).await {
            tracing::debug!(error = %e, "Socket write failed");
            break;
        }
    }
}

fn log_close_frame(frame: Option<&CloseFrame<'_>>) {
    let Some(frame) = frame else {
        return;
    };

    let code = u16::from(frame.code);
    match CloseSeverity::of(code) {
        CloseSeverity::Recoverable => {
            tracing::warn!(close_code = code, reason = %frame.reason, "Gateway closed the session");
        }
        CloseSeverity::Rejected => {
            tracing::error!(close_code = code, reason = %frame.reason, "Gateway rejected the session");
        }
        CloseSeverity::Routine => {
            tracing::debug!(close_code = code, reason = %frame.reason, "Close frame");
        }
    }
}

/// Sleep for `delay`; returns true if shutdown was signalled first
async fn wait_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    if delay.is_zero() {
        return false;
    }

    tokio::select! {
        _ = shutdown.changed() => true,
        () = tokio::time::sleep(delay) => false,
    }
}
