/// HTTP server configuration constants.

/// Interface the HTTP server binds to.
pub const BIND_HOST: &str = "127.0.0.1";

/// Port used when the `PORT` environment variable is absent or invalid.
pub const DEFAULT_PORT: u16 = 5000;

/// Number of rows returned by the leaderboard endpoint.
pub const LEADERBOARD_SIZE: usize = 10;

/// Resolve the listening port from the `PORT` environment variable.
pub fn port_from_env() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
