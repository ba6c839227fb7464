mod auth;
mod error;
mod handlers;
mod models;
mod rate_limit;
mod router;
mod state;

use auth::AuthKeys;
use engine::{EngineConfig, MatchEngine, MemoryLedger};
use handlers::ws::WsDispatcher;
use router::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    tracing::info!("Starting quiz duel gateway");

    let port: u16 = std::env::var("GATEWAY_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let starting_coins: u64 = std::env::var("STARTING_COINS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10_000);
    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set, using development secret");
        "dev-secret".to_string()
    });

    let ledger = Arc::new(MemoryLedger::new());
    let connections = Arc::new(WsDispatcher::new());
    let engine = MatchEngine::new(
        EngineConfig::default(),
        Arc::clone(&ledger) as Arc<dyn engine::BalanceGateway>,
        Arc::clone(&connections) as Arc<dyn engine::Dispatcher>,
    );

    let state = AppState::new(
        engine,
        ledger,
        connections,
        AuthKeys::new(&jwt_secret),
        starting_coins,
    );
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
