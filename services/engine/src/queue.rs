//! Queue registry
//!
//! One FIFO waiting list per wager tier, plus the queued-membership set,
//! all behind a single lock so enqueue/dequeue/removal are individually
//! atomic and a participant can never hold two entries at once.
//!
//! Every entry carries a one-shot token. The queue-timeout task removes an
//! entry only if its token is still present at fire time, which makes the
//! bounded-wait auto-removal race-free against a concurrently formed match.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use types::ids::PlayerId;
use types::player::PlayerProfile;
use types::tier::Tier;
use uuid::Uuid;

/// One waiting participant
#[derive(Debug, Clone)]
pub struct QueueEntry {
    /// One-shot token identifying this residence in the queue
    pub token: Uuid,
    pub profile: PlayerProfile,
    pub tier: Tier,
    /// Unix milliseconds at enqueue, preserved across a requeue
    pub queued_at: i64,
}

impl QueueEntry {
    pub fn new(profile: PlayerProfile, tier: Tier) -> Self {
        Self {
            token: Uuid::now_v7(),
            profile,
            tier,
            queued_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Result of an atomic join attempt
#[derive(Debug)]
pub enum JoinOutcome {
    /// The tier held a waiting entry; it was popped and both players are
    /// now held out of the queues until `confirm` or `push_front` resolves
    /// the in-flight match formation.
    Matched(QueueEntry),
    /// Queue was empty; the entry was appended at this 1-based position
    Queued { position: usize },
    /// The player already holds an entry (or is mid-formation)
    AlreadyQueued,
}

#[derive(Default)]
struct Inner {
    queues: HashMap<Tier, VecDeque<QueueEntry>>,
    /// Players currently queued or held for an in-flight match formation
    members: HashSet<PlayerId>,
}

/// FIFO waiting lists, one per tier
#[derive(Default)]
pub struct QueueRegistry {
    inner: Mutex<Inner>,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically match against the tier's oldest waiting entry, or enqueue.
    ///
    /// On `Matched`, both the incoming and the popped player stay in the
    /// membership set: formation is in flight and neither may re-enter a
    /// queue until `confirm` (success) or `push_front`/`release` (abort).
    pub fn try_join(&self, entry: QueueEntry) -> JoinOutcome {
        let mut inner = self.inner.lock().unwrap();
        if inner.members.contains(&entry.profile.player_id) {
            return JoinOutcome::AlreadyQueued;
        }

        let incoming = entry.profile.player_id;
        let queue = inner.queues.entry(entry.tier).or_default();
        if let Some(opponent) = queue.pop_front() {
            inner.members.insert(incoming);
            JoinOutcome::Matched(opponent)
        } else {
            queue.push_back(entry);
            let position = queue.len();
            inner.members.insert(incoming);
            JoinOutcome::Queued { position }
        }
    }

    /// Release both sides of a completed match formation
    pub fn confirm(&self, a: PlayerId, b: PlayerId) {
        let mut inner = self.inner.lock().unwrap();
        inner.members.remove(&a);
        inner.members.remove(&b);
    }

    /// Return an entry to the front of its tier queue, preserving its
    /// original priority (used when a reservation fails mid-formation)
    pub fn push_front(&self, entry: QueueEntry) {
        let mut inner = self.inner.lock().unwrap();
        inner.members.insert(entry.profile.player_id);
        inner.queues.entry(entry.tier).or_default().push_front(entry);
    }

    /// Drop a player's membership without touching any queue (the player
    /// held no entry, e.g. an aborted incoming side of a formation)
    pub fn release(&self, player: PlayerId) {
        self.inner.lock().unwrap().members.remove(&player);
    }

    /// Remove any entry for this player across all tiers; idempotent
    pub fn remove_player(&self, player: PlayerId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let mut removed = false;
        for queue in inner.queues.values_mut() {
            let before = queue.len();
            queue.retain(|e| e.profile.player_id != player);
            removed |= queue.len() != before;
        }
        if removed {
            inner.members.remove(&player);
        }
        removed
    }

    /// Remove the entry with this token if it is still queued.
    /// Returns the entry so the caller can notify the waiting player.
    pub fn remove_token(&self, token: Uuid) -> Option<QueueEntry> {
        let mut inner = self.inner.lock().unwrap();
        let mut found = None;
        for queue in inner.queues.values_mut() {
            if let Some(pos) = queue.iter().position(|e| e.token == token) {
                found = queue.remove(pos);
                break;
            }
        }
        let entry = found?;
        inner.members.remove(&entry.profile.player_id);
        Some(entry)
    }

    /// Whether the player currently holds an entry or is mid-formation
    pub fn contains(&self, player: PlayerId) -> bool {
        self.inner.lock().unwrap().members.contains(&player)
    }

    /// Current depth of one tier's waiting list
    pub fn depth(&self, tier: Tier) -> usize {
        self.inner
            .lock()
            .unwrap()
            .queues
            .get(&tier)
            .map(|q| q.len())
            .unwrap_or(0)
    }
}
