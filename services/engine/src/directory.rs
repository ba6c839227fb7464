//! Session directory
//!
//! Maps active session ids to their sessions and connected players to the
//! session they currently occupy (at most one). Shared across all sessions,
//! so both maps are concurrent; each operation is individually atomic.

use crate::session::Session;
use dashmap::DashMap;
use std::sync::Arc;
use types::ids::{PlayerId, SessionId};

#[derive(Default)]
pub struct SessionDirectory {
    sessions: DashMap<SessionId, Arc<Session>>,
    player_sessions: DashMap<PlayerId, SessionId>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly formed session and both participants
    pub fn insert(&self, session: Arc<Session>, players: [PlayerId; 2]) {
        for player in players {
            self.player_sessions.insert(player, session.id);
        }
        self.sessions.insert(session.id, session);
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.get(&id).map(|s| Arc::clone(&s))
    }

    /// The session a player currently occupies, if any
    pub fn session_for(&self, player: PlayerId) -> Option<Arc<Session>> {
        let id = *self.player_sessions.get(&player)?;
        self.get(id)
    }

    pub fn contains_player(&self, player: PlayerId) -> bool {
        self.player_sessions.contains_key(&player)
    }

    /// Remove a session and its player mappings; idempotent
    pub fn remove(&self, id: SessionId) {
        if let Some((_, session)) = self.sessions.remove(&id) {
            for player in session.player_ids() {
                // Only unmap players still pointing at this session; a
                // player may already occupy a newer one.
                self.player_sessions
                    .remove_if(&player, |_, mapped| *mapped == id);
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}
