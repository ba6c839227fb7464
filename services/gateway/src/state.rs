use crate::auth::AuthKeys;
use crate::handlers::ws::WsDispatcher;
use crate::rate_limit::RateLimiter;
use engine::{MatchEngine, MemoryLedger};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchEngine>,
    pub ledger: Arc<MemoryLedger>,
    pub connections: Arc<WsDispatcher>,
    pub rate_limiter: Arc<RateLimiter>,
    pub auth: Arc<AuthKeys>,
    /// Balance granted to first-time players
    pub starting_coins: u64,
}

impl AppState {
    pub fn new(
        engine: Arc<MatchEngine>,
        ledger: Arc<MemoryLedger>,
        connections: Arc<WsDispatcher>,
        auth: AuthKeys,
        starting_coins: u64,
    ) -> Self {
        Self {
            engine,
            ledger,
            connections,
            rate_limiter: Arc::new(RateLimiter::new()),
            auth: Arc::new(auth),
            starting_coins,
        }
    }
}
