//! Matchmaking configuration constants.
//! 
//! This module defines parameters for the single-slot waiting room.

/// Wait before falling back to the scripted opponent (in seconds).
pub const QUEUE_TIMEOUT_SECS: u64 = 10;

/// Address recorded for the scripted opponent in every match it plays.
pub const SCRIPTED_PLAYER_ADDRESS: &str = "0x00000000000000000000000000000000000000AI";
