/// Matchmaking module: the waiting slot and match creation.

pub mod server;
pub mod types;
