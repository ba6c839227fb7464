//! Engine configuration

use std::time::Duration;

/// Tunable parameters for queueing and session lifecycle
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay between match formation and countdown start (client animation)
    pub match_found_delay: Duration,
    /// Number of one-second countdown ticks before the game starts
    pub countdown_ticks: u32,
    /// Fixed match duration once active
    pub match_duration: Duration,
    /// Questions generated per session
    pub question_count: usize,
    /// How long an unmatched queue entry waits before auto-removal
    pub queue_timeout: Duration,
    /// How long a finished session stays queryable before cleanup
    pub retention_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_found_delay: Duration::from_secs(3),
            countdown_ticks: 5,
            match_duration: Duration::from_secs(120),
            question_count: 20,
            queue_timeout: Duration::from_secs(300),
            retention_window: Duration::from_secs(30),
        }
    }
}
