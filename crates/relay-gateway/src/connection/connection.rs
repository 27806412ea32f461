//! A single gateway socket
//!
//! Owned by the client's receive loop; frames leave through a channel drained
//! by the writer task, which serializes every write to the socket.

use super::Heartbeat;
use crate::protocol::GatewayMessage;
use tokio::sync::mpsc;

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Socket being opened
    Connecting,
    /// Socket open, waiting for Hello
    Connected,
    /// Identify or Resume sent
    Handshaking,
    /// READY or RESUMED received
    Established,
    /// Socket torn down
    Disconnected,
}

/// One live socket and its keepalive timer
#[derive(Debug)]
pub struct Connection {
    /// Channel to the writer task
    sender: mpsc::Sender<GatewayMessage>,

    state: ConnectionState,

    heartbeat: Heartbeat,
}

impl Connection {
    /// Create a connection feeding the given writer channel
    #[must_use]
    pub fn new(sender: mpsc::Sender<GatewayMessage>) -> Self {
        Self {
            sender,
            state: ConnectionState::Connecting,
            heartbeat: Heartbeat::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    #[must_use]
    pub fn heartbeat(&self) -> &Heartbeat {
        &self.heartbeat
    }

    pub fn heartbeat_mut(&mut self) -> &mut Heartbeat {
        &mut self.heartbeat
    }

    /// Queue a frame for the socket
    pub async fn send(
        &self,
        message: GatewayMessage,
    ) -> Result<(), mpsc::error::SendError<GatewayMessage>> {
        self.sender.send(message).await
    }

    /// Send a heartbeat carrying `seq` and restart the latency clock
    pub async fn send_heartbeat(
        &mut self,
        seq: Option<u64>,
    ) -> Result<(), mpsc::error::SendError<GatewayMessage>> {
        self.sender.send(GatewayMessage::heartbeat(seq)).await?;
        self.heartbeat.record_sent();
        Ok(())
    }

    /// Stop the heartbeat and mark the connection dead
    ///
    /// Must run before the next connect attempt.
    pub fn close(&mut self) {
        self.heartbeat.stop();
        self.state = ConnectionState::Disconnected;
    }
}
