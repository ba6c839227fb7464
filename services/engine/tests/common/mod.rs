//! Shared test harness: engine wired to an in-memory ledger and a capture
//! dispatcher, with a fast configuration so paused-clock tests stay short.

use engine::dispatch::CaptureDispatcher;
use engine::{EngineConfig, MatchEngine, MemoryLedger};
use std::sync::Arc;
use std::time::Duration;
use types::ids::PlayerId;
use types::player::PlayerProfile;

pub struct Harness {
    pub engine: Arc<MatchEngine>,
    pub ledger: Arc<MemoryLedger>,
    pub dispatcher: Arc<CaptureDispatcher>,
}

impl Harness {
    pub fn new(config: EngineConfig) -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        let dispatcher = Arc::new(CaptureDispatcher::new());
        let engine = MatchEngine::new(
            config,
            Arc::clone(&ledger) as Arc<dyn engine::BalanceGateway>,
            Arc::clone(&dispatcher) as Arc<dyn engine::Dispatcher>,
        );
        Self {
            engine,
            ledger,
            dispatcher,
        }
    }

    /// Open an account and return its profile
    pub fn player(&self, username: &str, coins: u64) -> PlayerProfile {
        let profile = PlayerProfile::new(PlayerId::new(), username, "🎯");
        self.ledger.open_account(profile.player_id, coins);
        profile
    }
}

/// Short timings so a full lifecycle fits in a few paused-clock seconds
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        match_found_delay: Duration::from_secs(1),
        countdown_ticks: 2,
        match_duration: Duration::from_secs(30),
        question_count: 3,
        queue_timeout: Duration::from_secs(60),
        retention_window: Duration::from_secs(5),
    }
}

/// Advance the paused clock and let woken timer tasks run to their next
/// await point before the test resumes.
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Correct answer per question ordinal, read through the session lock
pub async fn correct_answers(engine: &Arc<MatchEngine>, player: PlayerId) -> Vec<u32> {
    let session = engine.session_for(player).expect("player has a session");
    let state = session.lock().await;
    state.questions.iter().map(|q| q.correct).collect()
}
