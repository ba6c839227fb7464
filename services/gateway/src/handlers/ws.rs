//! WebSocket endpoint
//!
//! One socket per player. Inbound frames are `ClientMessage` actions fed
//! to the engine; outbound engine notifications flow through a
//! per-connection unbounded channel so the engine never blocks on a slow
//! socket. A dropped or closed socket is a disconnect: the engine resolves
//! any queue entry or session the player held.

use crate::error::AppError;
use crate::models::ClientMessage;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use dashmap::DashMap;
use engine::{Dispatcher, Outbound};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc::{self, UnboundedSender};
use types::ids::PlayerId;
use types::player::PlayerProfile;

/// Routes engine notifications to live connections.
///
/// Events for players with no registered sender are dropped, matching the
/// engine's at-most-once delivery contract for vanished clients.
#[derive(Default)]
pub struct WsDispatcher {
    senders: DashMap<PlayerId, UnboundedSender<Outbound>>,
}

impl WsDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection, replacing any previous one for this player
    fn register(&self, player: PlayerId, sender: UnboundedSender<Outbound>) {
        self.senders.insert(player, sender);
    }

    /// Unregister only if this exact connection is still the current one;
    /// a reconnect that already replaced it stays registered
    fn unregister(&self, player: PlayerId, sender: &UnboundedSender<Outbound>) -> bool {
        self.senders
            .remove_if(&player, |_, current| current.same_channel(sender))
            .is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.senders.len()
    }
}

impl Dispatcher for WsDispatcher {
    fn send(&self, player: PlayerId, event: Outbound) {
        if let Some(sender) = self.senders.get(&player) {
            tracing::trace!(%player, event = event.kind_label(), "dispatch");
            // A full or closed channel means the connection is going away;
            // the read loop will surface the disconnect.
            let _ = sender.send(event);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    // Browsers cannot set headers on the upgrade request, so the token may
    // arrive as a query parameter instead.
    let token = match query.token {
        Some(token) => token,
        None => headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".into()))?,
    };
    let profile = state.auth.verify(&token)?;

    state.rate_limiter.check_rate_limit(
        &format!("{}:ws_connections", profile.player_id),
        10,
        1.0,
    )?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, profile)))
}

async fn handle_socket(socket: WebSocket, state: AppState, profile: PlayerProfile) {
    let player = profile.player_id;
    state.ledger.ensure_account(player, state.starting_coins);
    tracing::info!(%player, username = %profile.username, "connected");

    let (tx, mut rx) = mpsc::unbounded_channel();
    state.connections.register(player, tx.clone());

    let (mut sink, mut stream) = socket.split();

    // Outbound pump: engine notifications → socket frames
    let mut writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(%err, "outbound serialization failed");
                    continue;
                }
            };
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound loop: client actions → engine
    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_client_message(&state, &profile, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(%player, %err, "socket error");
                    break;
                }
            },
            // Writer exiting means the socket is unusable
            _ = &mut writer => break,
        }
    }

    writer.abort();
    // Only resolve the disconnect if this connection is still current; a
    // reconnect may already have taken over.
    if state.connections.unregister(player, &tx) {
        state.engine.disconnect(player).await;
    }
    tracing::info!(%player, "disconnected");
}

async fn handle_client_message(state: &AppState, profile: &PlayerProfile, text: &str) {
    let player = profile.player_id;
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            tracing::debug!(%player, %err, "unparseable client message");
            return;
        }
    };

    match message {
        ClientMessage::JoinQueue { entry_fee } => {
            if state
                .rate_limiter
                .check_rate_limit(&format!("{}:join_queue", player), 10, 0.5)
                .is_err()
            {
                tracing::debug!(%player, "join rate limited");
                return;
            }
            // Rejections surface to the player as engine notices
            let _ = state.engine.join_queue(profile.clone(), entry_fee).await;
        }
        ClientMessage::LeaveQueue => state.engine.leave_queue(player),
        ClientMessage::SubmitAnswer {
            question_index,
            answer,
        } => {
            state.engine.submit_answer(player, question_index, answer).await;
        }
    }
}
