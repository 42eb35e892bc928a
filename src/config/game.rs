/// Game configuration constants.
/// 
/// This module defines the board size and the timers that drive a match
/// once it has been created.
pub const BOARD_CELLS: usize = 9; // 3x3 grid, row-major.

/// Delay (in milliseconds) before the scripted opponent answers a human move.
/// Gives the board update time to reach the human before the counter-move lands.
pub const SCRIPTED_THINK_DELAY_MS: u64 = 1000;

/// Time (in seconds) a completed match stays in the registry for late queries.
pub const MATCH_RETENTION_SECS: u64 = 60;
