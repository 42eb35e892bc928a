/// Main configuration module.
/// 
/// Re-exports submodules for game, matchmaking and server configuration.
pub mod matchmaking;
pub mod game;
pub mod server;

use std::time::Duration;

use self::game::{MATCH_RETENTION_SECS, SCRIPTED_THINK_DELAY_MS};
use self::matchmaking::QUEUE_TIMEOUT_SECS;

/// Timer durations injected into the matchmaking and game session actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchTimings {
    /// How long a lone participant waits before being paired with the scripted opponent.
    pub queue_timeout: Duration,
    /// Delay before the scripted opponent plays its move.
    pub think_delay: Duration,
    /// How long a completed match stays queryable before eviction.
    pub retention: Duration,
}

impl Default for MatchTimings {
    fn default() -> Self {
        Self {
            queue_timeout: Duration::from_secs(QUEUE_TIMEOUT_SECS),
            think_delay: Duration::from_millis(SCRIPTED_THINK_DELAY_MS),
            retention: Duration::from_secs(MATCH_RETENTION_SECS),
        }
    }
}
