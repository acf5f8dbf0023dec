//! Reconnecting WebSocket transport.
//!
//! The transport owns the connection lifecycle so the rest of the client only
//! sees typed messages and connection-state changes. On any failure it
//! reconnects forever with capped exponential backoff; the delay resets after
//! each successful connect.

use board_core::message::{ClientMessage, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Reconnection backoff parameters.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Initial delay between reconnect attempts in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnect attempts in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before the given zero-based attempt, capped at the maximum.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        let delay = (self.initial_delay_ms as f64) * self.multiplier.powi(attempt as i32);
        (delay as u64).min(self.max_delay_ms)
    }
}

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// WebSocket URL, e.g. `ws://localhost:3000/ws`.
    pub url: String,
    /// Reconnection backoff.
    pub retry: RetryConfig,
}

impl TransportConfig {
    /// Configuration with default backoff.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            retry: RetryConfig::default(),
        }
    }
}

/// Connection-state changes and inbound messages, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The connection is established. `reconnect` is true for every connect
    /// after the first; the client must resync then.
    Connected {
        /// Whether this follows an earlier successful connection.
        reconnect: bool,
    },
    /// The connection is gone; the transport is backing off before retrying.
    Disconnected {
        /// Human-readable cause.
        reason: String,
    },
    /// A typed message from the server.
    Message(ServerMessage),
}

/// Handle for sending messages over the transport.
#[derive(Debug)]
pub struct TransportHandle {
    outbound: mpsc::UnboundedSender<ClientMessage>,
    task: JoinHandle<()>,
}

impl TransportHandle {
    /// Queue a message for sending.
    ///
    /// Best-effort: while disconnected, queued messages are sent once the
    /// connection is reestablished.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TransportClosed`] if the transport task is gone.
    pub fn send(&self, message: ClientMessage) -> Result<(), ClientError> {
        self.outbound
            .send(message)
            .map_err(|_| ClientError::TransportClosed)
    }

    /// Stop the transport task.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// The reconnecting transport.
pub struct Transport;

impl Transport {
    /// Spawn the connection task.
    ///
    /// Returns a send handle and the stream of [`TransportEvent`]s. Dropping
    /// the event receiver stops the task at the next event.
    #[must_use]
    pub fn spawn(
        config: TransportConfig,
    ) -> (TransportHandle, mpsc::UnboundedReceiver<TransportEvent>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(config, outbound_rx, event_tx));

        (
            TransportHandle {
                outbound: outbound_tx,
                task,
            },
            event_rx,
        )
    }
}

/// Connection loop: connect, pump, back off, repeat.
async fn run(
    config: TransportConfig,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientMessage>,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut attempt: u32 = 0;
    let mut ever_connected = false;

    loop {
        match connect_async(&config.url).await {
            Ok((stream, _response)) => {
                tracing::info!(url = %config.url, "websocket connected");
                let reconnect = ever_connected;
                ever_connected = true;
                attempt = 0;

                if event_tx
                    .send(TransportEvent::Connected { reconnect })
                    .is_err()
                {
                    return;
                }

                match pump(stream, &mut outbound_rx, &event_tx).await {
                    PumpExit::Shutdown => return,
                    PumpExit::ConnectionLost(reason) => {
                        tracing::warn!(url = %config.url, "websocket disconnected: {reason}");
                        if event_tx
                            .send(TransportEvent::Disconnected { reason })
                            .is_err()
                        {
                            return;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(url = %config.url, "websocket connect failed: {e}");
                if event_tx
                    .send(TransportEvent::Disconnected {
                        reason: e.to_string(),
                    })
                    .is_err()
                {
                    return;
                }
            }
        }

        let delay = config.retry.delay_for_attempt(attempt);
        attempt = attempt.saturating_add(1);
        tracing::debug!("reconnecting in {delay}ms (attempt {attempt})");
        tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
    }
}

enum PumpExit {
    /// The handle side was dropped; stop for good.
    Shutdown,
    /// The connection failed; reconnect.
    ConnectionLost(String),
}

/// Pump one live connection until it drops or the client shuts down.
async fn pump(
    stream: WsStream,
    outbound_rx: &mut mpsc::UnboundedReceiver<ClientMessage>,
    event_tx: &mpsc::UnboundedSender<TransportEvent>,
) -> PumpExit {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            outgoing = outbound_rx.recv() => {
                let Some(message) = outgoing else {
                    return PumpExit::Shutdown;
                };
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("failed to serialize outbound message: {e}");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(json)).await {
                    return PumpExit::ConnectionLost(e.to_string());
                }
            }

            incoming = source.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerMessage>(&text) {
                            Ok(message) => {
                                if event_tx.send(TransportEvent::Message(message)).is_err() {
                                    return PumpExit::Shutdown;
                                }
                            }
                            Err(e) => {
                                // One unreadable frame must not drop the link.
                                tracing::warn!("dropping unparseable server message: {e}");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        return PumpExit::ConnectionLost("server closed connection".to_string());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return PumpExit::ConnectionLost(e.to_string()),
                    None => return PumpExit::ConnectionLost("stream ended".to_string()),
                }
            }
        }
    }
}
