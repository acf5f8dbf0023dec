//! High-level board client: transport plus replica.

use board_core::message::{ClientMessage, ServerMessage};
use board_core::stroke::Stroke;
use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::replica::BoardReplica;
use crate::transport::{Transport, TransportConfig, TransportEvent, TransportHandle};

/// A connected participant: owns the local replica and keeps it in sync with
/// the server through the reconnecting transport.
pub struct BoardClient {
    transport: TransportHandle,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    replica: BoardReplica,
    connected: bool,
}

impl BoardClient {
    /// Connect to a board server and create a local replica surface.
    ///
    /// The connection is established in the background; the first
    /// [`TransportEvent::Connected`] arrives via [`BoardClient::next_event`].
    ///
    /// # Errors
    ///
    /// Returns an error if the local surface cannot be allocated.
    pub fn connect(url: impl Into<String>, width: u32, height: u32) -> Result<Self, ClientError> {
        let (transport, events) = Transport::spawn(TransportConfig::new(url));
        Ok(Self {
            transport,
            events,
            replica: BoardReplica::new(width, height)?,
            connected: false,
        })
    }

    /// Wait for the next transport event and apply it to the replica.
    ///
    /// Server messages update the replica before the event is returned.
    /// After a reconnect, a `sync-request` is issued automatically so strokes
    /// missed while offline are reconciled by full replacement.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        let event = self.events.recv().await?;

        match &event {
            TransportEvent::Connected { reconnect } => {
                self.connected = true;
                if *reconnect {
                    tracing::info!("reconnected, requesting full state sync");
                    if self.transport.send(ClientMessage::SyncRequest).is_err() {
                        tracing::warn!("transport closed during resync request");
                    }
                }
            }
            TransportEvent::Disconnected { reason } => {
                self.connected = false;
                tracing::warn!("disconnected: {reason}");
            }
            TransportEvent::Message(message) => {
                self.apply(message);
            }
        }

        Some(event)
    }

    fn apply(&mut self, message: &ServerMessage) {
        self.replica.apply(message);
    }

    /// Submit a finished stroke. The caller has already rendered it locally.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TransportClosed`] if the transport is gone.
    pub fn submit_stroke(&self, stroke: Stroke) -> Result<(), ClientError> {
        self.transport.send(ClientMessage::StrokeSubmit { stroke })
    }

    /// Finish the replica's active stroke and submit it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TransportClosed`] if the transport is gone.
    pub fn finish_and_submit(&mut self) -> Result<Option<Stroke>, ClientError> {
        match self.replica.finish_stroke() {
            Some(stroke) => {
                self.submit_stroke(stroke.clone())?;
                Ok(Some(stroke))
            }
            None => Ok(None),
        }
    }

    /// Ask the server to clear the shared board for everyone.
    ///
    /// The local surface is not touched here; it clears when the symmetric
    /// `clear-broadcast` comes back, keeping all participants in lock-step.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TransportClosed`] if the transport is gone.
    pub fn request_clear(&self) -> Result<(), ClientError> {
        self.transport.send(ClientMessage::ClearRequest)
    }

    /// Request a full state snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TransportClosed`] if the transport is gone.
    pub fn request_sync(&self) -> Result<(), ClientError> {
        self.transport.send(ClientMessage::SyncRequest)
    }

    /// Whether the transport currently has a live connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The local replica.
    #[must_use]
    pub fn replica(&self) -> &BoardReplica {
        &self.replica
    }

    /// Mutable access to the local replica, for local drawing.
    pub fn replica_mut(&mut self) -> &mut BoardReplica {
        &mut self.replica
    }

    /// Disconnect and stop the transport task.
    pub fn shutdown(self) {
        self.transport.shutdown();
    }
}
