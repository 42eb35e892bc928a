pub mod server;
pub mod messages;
