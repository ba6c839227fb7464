//! Queueing and match-formation behavior: FIFO pairing, single membership,
//! wager reservation, formation unwinding and bounded queue waits.

mod common;

use common::{advance, fast_config, Harness};
use engine::Outbound;
use std::sync::Arc;
use std::time::Duration;
use types::tier::Tier;

#[tokio::test(start_paused = true)]
async fn test_second_joiner_pairs_with_oldest_waiter() {
    let h = Harness::new(fast_config());
    let a = h.player("alice", 10_000);
    let b = h.player("bob", 10_000);

    h.engine.join_queue(a.clone(), 500).await.unwrap();
    assert_eq!(h.engine.queue_depth(Tier::Coins500), 1);
    assert_eq!(h.dispatcher.count_for(a.player_id, "queueJoined"), 1);

    h.engine.join_queue(b.clone(), 500).await.unwrap();
    assert_eq!(h.engine.queue_depth(Tier::Coins500), 0);
    assert_eq!(h.engine.active_session_count(), 1);

    // Each side learns the other's identity and the pool
    let found = h
        .dispatcher
        .events_for(a.player_id)
        .into_iter()
        .find_map(|e| match e {
            Outbound::MatchFound {
                opponent,
                prize_pool,
                ..
            } => Some((opponent, prize_pool)),
            _ => None,
        })
        .expect("waiting side notified");
    assert_eq!(found.0.player_id, b.player_id);
    assert_eq!(found.1, 1000);
    assert_eq!(h.dispatcher.count_for(b.player_id, "matchFound"), 1);

    // Both wagers reserved at formation
    assert_eq!(h.ledger.balance(a.player_id), 9_500);
    assert_eq!(h.ledger.balance(b.player_id), 9_500);
}

#[tokio::test(start_paused = true)]
async fn test_third_joiner_starts_a_fresh_wait() {
    let h = Harness::new(fast_config());
    let a = h.player("alice", 10_000);
    let b = h.player("bob", 10_000);
    let c = h.player("carol", 10_000);

    h.engine.join_queue(a, 1000).await.unwrap();
    h.engine.join_queue(b, 1000).await.unwrap();
    h.engine.join_queue(c.clone(), 1000).await.unwrap();

    // Exactly one session; the odd player out waits alone
    assert_eq!(h.engine.active_session_count(), 1);
    assert_eq!(h.engine.queue_depth(Tier::Coins1000), 1);
    assert!(h
        .dispatcher
        .events_for(c.player_id)
        .iter()
        .any(|e| matches!(e, Outbound::QueueJoined { position: 1, .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_joiners_claim_waiter_once() {
    // Real threads so the joins genuinely contend on the registry lock
    for _ in 0..50 {
        let h = Harness::new(fast_config());
        let waiter = h.player("waiter", 10_000);
        h.engine.join_queue(waiter.clone(), 500).await.unwrap();

        let joiners: Vec<_> = ["alice", "bob", "carol"]
            .into_iter()
            .map(|name| h.player(name, 10_000))
            .collect();
        let mut handles = Vec::new();
        for profile in joiners {
            let engine = Arc::clone(&h.engine);
            handles.push(tokio::spawn(async move {
                let _ = engine.join_queue(profile, 500).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // The waiter is claimed by exactly one joiner; every player ends up
        // in exactly one session or one queue entry, never two, never zero.
        let sessions = h.engine.active_session_count();
        let queued = h.engine.queue_depth(Tier::Coins500);
        assert_eq!(
            sessions * 2 + queued,
            4,
            "sessions={} queued={}",
            sessions,
            queued
        );
        assert_eq!(h.dispatcher.count_for(waiter.player_id, "matchFound"), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_tiers_are_isolated() {
    let h = Harness::new(fast_config());
    let a = h.player("alice", 10_000);
    let b = h.player("bob", 10_000);

    h.engine.join_queue(a, 200).await.unwrap();
    h.engine.join_queue(b, 5000).await.unwrap();

    // Different tiers never pair
    assert_eq!(h.engine.active_session_count(), 0);
    assert_eq!(h.engine.queue_depth(Tier::Coins200), 1);
    assert_eq!(h.engine.queue_depth(Tier::Coins5000), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_tier_rejected_with_notice() {
    let h = Harness::new(fast_config());
    let a = h.player("alice", 10_000);

    let err = h.engine.join_queue(a.clone(), 300).await.unwrap_err();
    assert!(matches!(err, engine::EngineError::InvalidTier(300)));
    assert_eq!(h.dispatcher.count_for(a.player_id, "error"), 1);
    assert_eq!(h.dispatcher.count_for(a.player_id, "queueJoined"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_double_join_rejected() {
    let h = Harness::new(fast_config());
    let a = h.player("alice", 10_000);

    h.engine.join_queue(a.clone(), 500).await.unwrap();
    let err = h.engine.join_queue(a.clone(), 500).await.unwrap_err();
    assert!(matches!(err, engine::EngineError::AlreadyQueued));

    // Also across tiers: one entry per player, total
    let err = h.engine.join_queue(a.clone(), 2000).await.unwrap_err();
    assert!(matches!(err, engine::EngineError::AlreadyQueued));
    assert_eq!(h.engine.queue_depth(Tier::Coins500), 1);
    assert_eq!(h.engine.queue_depth(Tier::Coins2000), 0);
}

#[tokio::test(start_paused = true)]
async fn test_join_while_in_session_rejected() {
    let h = Harness::new(fast_config());
    let a = h.player("alice", 10_000);
    let b = h.player("bob", 10_000);

    h.engine.join_queue(a.clone(), 500).await.unwrap();
    h.engine.join_queue(b, 500).await.unwrap();
    assert_eq!(h.engine.active_session_count(), 1);

    let err = h.engine.join_queue(a.clone(), 500).await.unwrap_err();
    assert!(matches!(err, engine::EngineError::AlreadyInSession));
}

#[tokio::test(start_paused = true)]
async fn test_incoming_reservation_failure_restores_waiter() {
    let h = Harness::new(fast_config());
    let a = h.player("alice", 10_000);
    let broke = h.player("bob", 100);

    h.engine.join_queue(a.clone(), 500).await.unwrap();
    let err = h.engine.join_queue(broke.clone(), 500).await.unwrap_err();
    assert!(matches!(err, engine::EngineError::InsufficientFunds));

    // No session, nothing deducted, the waiter is back at the front
    assert_eq!(h.engine.active_session_count(), 0);
    assert_eq!(h.ledger.balance(a.player_id), 10_000);
    assert_eq!(h.ledger.balance(broke.player_id), 100);
    assert_eq!(h.engine.queue_depth(Tier::Coins500), 1);

    // A later joiner still pairs with the original waiter
    let c = h.player("carol", 10_000);
    h.engine.join_queue(c, 500).await.unwrap();
    assert_eq!(h.engine.active_session_count(), 1);
    assert_eq!(h.dispatcher.count_for(a.player_id, "matchFound"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_waiter_reservation_failure_requeues_incoming_at_front() {
    let h = Harness::new(fast_config());
    let broke = h.player("alice", 100);
    let b = h.player("bob", 10_000);

    h.engine.join_queue(broke.clone(), 500).await.unwrap();
    // Formation starts, the waiter's balance no longer covers the wager
    h.engine.join_queue(b.clone(), 500).await.unwrap();

    assert_eq!(h.engine.active_session_count(), 0);
    // The waiter was notified and removed; the incoming side was refunded
    // and re-enqueued at the front
    assert_eq!(h.dispatcher.count_for(broke.player_id, "error"), 1);
    assert_eq!(h.ledger.balance(b.player_id), 10_000);
    assert_eq!(h.engine.queue_depth(Tier::Coins500), 1);
    assert_eq!(h.dispatcher.count_for(b.player_id, "queueJoined"), 1);

    let c = h.player("carol", 10_000);
    h.engine.join_queue(c, 500).await.unwrap();
    assert_eq!(h.dispatcher.count_for(b.player_id, "matchFound"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_queue_wait_is_bounded() {
    let config = fast_config();
    let timeout = config.queue_timeout;
    let h = Harness::new(config);
    let a = h.player("alice", 10_000);

    h.engine.join_queue(a.clone(), 500).await.unwrap();
    advance(timeout + Duration::from_secs(1)).await;

    assert_eq!(h.dispatcher.count_for(a.player_id, "queueTimedOut"), 1);
    assert_eq!(h.engine.queue_depth(Tier::Coins500), 0);

    // The player can rejoin afterwards
    h.engine.join_queue(a.clone(), 500).await.unwrap();
    assert_eq!(h.engine.queue_depth(Tier::Coins500), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_timeout_after_match_formed() {
    let config = fast_config();
    let timeout = config.queue_timeout;
    let h = Harness::new(config);
    let a = h.player("alice", 10_000);
    let b = h.player("bob", 10_000);

    h.engine.join_queue(a.clone(), 500).await.unwrap();
    h.engine.join_queue(b, 500).await.unwrap();

    advance(timeout + Duration::from_secs(1)).await;
    assert_eq!(h.dispatcher.count_for(a.player_id, "queueTimedOut"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_leave_queue_is_idempotent_and_silent() {
    let h = Harness::new(fast_config());
    let a = h.player("alice", 10_000);

    h.engine.join_queue(a.clone(), 200).await.unwrap();
    h.engine.leave_queue(a.player_id);
    assert_eq!(h.engine.queue_depth(Tier::Coins200), 0);

    // Leaving again, or without ever joining, does nothing
    h.engine.leave_queue(a.player_id);
    let events = h.dispatcher.events_for(a.player_id);
    assert_eq!(events.len(), 1); // only the original queueJoined
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_drops_queue_entry() {
    let h = Harness::new(fast_config());
    let a = h.player("alice", 10_000);

    h.engine.join_queue(a.clone(), 1000).await.unwrap();
    h.engine.disconnect(a.player_id).await;
    assert_eq!(h.engine.queue_depth(Tier::Coins1000), 0);

    // The vacated slot is matchable again
    let b = h.player("bob", 10_000);
    h.engine.join_queue(b.clone(), 1000).await.unwrap();
    assert_eq!(h.engine.queue_depth(Tier::Coins1000), 1);
}
