//! Matchmaking & Session Lifecycle Engine
//!
//! Pairs waiting players into head-to-head timed quiz sessions, wagering a
//! virtual coin balance per session, and drives each session through its
//! lifecycle under real-time score and timer updates.
//!
//! # Architecture
//!
//! ```text
//! Inbound events (gateway)
//!        │
//!    ┌───▼────────┐
//!    │ MatchEngine│  ← join/leave queue, answers, disconnects
//!    └───┬────────┘
//!        │
//!   ┌────┴──────────┬───────────────┐
//!   │               │               │
//! ┌─▼──────────┐ ┌──▼────────────┐ ┌▼──────────────┐
//! │QueueRegistry│ │SessionDirectory│ │BalanceGateway │
//! └─────────────┘ └──┬────────────┘ └───────────────┘
//!                    │
//!              ┌─────▼─────┐
//!              │  Session  │  ← one lock + two timers per session
//!              └─────┬─────┘
//!                    │
//!             Dispatcher (outbound notifications)
//! ```
//!
//! Each session is an independently serialized unit: answers, timer fires
//! and disconnects against the same session never interleave, while
//! different sessions proceed fully in parallel. Match formation is atomic
//! end to end; settlement runs exactly once per session.

pub mod config;
pub mod directory;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod questions;
pub mod queue;
pub mod session;
pub mod settlement;

pub use config::EngineConfig;
pub use dispatch::Dispatcher;
pub use engine::MatchEngine;
pub use error::{EngineError, LedgerError};
pub use events::Outbound;
pub use ledger::{BalanceGateway, MemoryLedger};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
