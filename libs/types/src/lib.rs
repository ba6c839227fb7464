//! Types library for the quiz duel backend
//!
//! This library provides all core type definitions shared between the
//! matchmaking engine and the gateway, ensuring type safety across the
//! service boundary.
//!
//! # Modules
//! - `ids`: Unique identifiers (PlayerId, SessionId)
//! - `tier`: Fixed wager tiers defining the matchmaking queues
//! - `player`: Public player identity
//! - `question`: Graded multiple-choice question types
//! - `session`: Session lifecycle status
//! - `record`: Persisted match result row

// Public modules
pub mod ids;
pub mod player;
pub mod question;
pub mod record;
pub mod session;
pub mod tier;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::player::*;
    pub use crate::question::*;
    pub use crate::record::*;
    pub use crate::session::*;
    pub use crate::tier::*;
}
