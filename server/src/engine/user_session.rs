use tokio::sync::mpsc;

use super::events::{ChatEvent, SessionId};

/// Maximum queued outbound events per session (prevents memory exhaustion from slow clients).
pub const MAX_OUTBOUND_QUEUE: usize = 1024;

/// Non-owning handle to a connected session, stored in room membership.
///
/// Holds only a weak sender: rooms never keep a connection's writer alive.
/// Once the session drops its own sender, every send through the handle fails.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: SessionId,
    outbound: mpsc::WeakSender<ChatEvent>,
}

impl SessionHandle {
    pub fn new(id: SessionId, outbound: &mpsc::Sender<ChatEvent>) -> Self {
        Self {
            id,
            outbound: outbound.downgrade(),
        }
    }

    /// Send an event to this session. Returns false if the session is gone
    /// or the outbound queue is full (slow client protection — drops event rather than blocking).
    pub fn send(&self, event: ChatEvent) -> bool {
        match self.outbound.upgrade() {
            Some(tx) => tx.try_send(event).is_ok(),
            None => false,
        }
    }
}
