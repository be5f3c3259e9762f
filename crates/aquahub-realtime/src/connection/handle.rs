//! Individual WebSocket connection handle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use aquahub_core::types::Principal;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Why a payload could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The outbound queue is at capacity.
    Full,
    /// The socket task has gone away.
    Closed,
    /// The connection was already marked dead.
    Dead,
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "send buffer full"),
            Self::Closed => write!(f, "connection closed"),
            Self::Dead => write!(f, "connection dead"),
        }
    }
}

/// A handle to a single WebSocket connection.
///
/// The registry owns the handle. Dropping it drops the sender, which ends
/// the socket task's receive loop and closes the socket.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Authenticated principal behind the socket
    pub principal: Principal,
    /// When the connection was registered
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    pub fn new(principal: Principal, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            principal,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a payload without waiting. Any failure marks the handle dead.
    pub fn try_deliver(&self, payload: &str) -> Result<(), DeliveryFailure> {
        if !self.is_alive() {
            return Err(DeliveryFailure::Dead);
        }
        let failure = match self.sender.try_send(payload.to_string()) {
            Ok(()) => return Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => DeliveryFailure::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => DeliveryFailure::Closed,
        };
        self.mark_dead();
        Err(failure)
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
