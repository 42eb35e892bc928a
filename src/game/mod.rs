pub mod board;
pub mod state;
pub mod opponent;
