//! Outbound dispatch boundary
//!
//! The engine never talks to sockets directly; it hands notifications to a
//! `Dispatcher` keyed by player id. The gateway implements this over
//! per-connection channels. Delivery must not block: a slow or vanished
//! client drops events rather than stalling a session.

use crate::events::Outbound;
use std::sync::Mutex;
use types::ids::PlayerId;

/// Delivers outbound events to a specific player's connection
pub trait Dispatcher: Send + Sync {
    /// Deliver one event; must return immediately. Events for players with
    /// no live connection are silently dropped.
    fn send(&self, player: PlayerId, event: Outbound);
}

/// Capture dispatcher recording every event, for tests
#[derive(Default)]
pub struct CaptureDispatcher {
    sent: Mutex<Vec<(PlayerId, Outbound)>>,
}

impl CaptureDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, in delivery order
    pub fn events(&self) -> Vec<(PlayerId, Outbound)> {
        self.sent.lock().unwrap().clone()
    }

    /// Events delivered to one player, in order
    pub fn events_for(&self, player: PlayerId) -> Vec<Outbound> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Count of events of a given label delivered to one player
    pub fn count_for(&self, player: PlayerId, label: &str) -> usize {
        self.events_for(player)
            .iter()
            .filter(|e| e.kind_label() == label)
            .count()
    }
}

impl Dispatcher for CaptureDispatcher {
    fn send(&self, player: PlayerId, event: Outbound) {
        self.sent.lock().unwrap().push((player, event));
    }
}
