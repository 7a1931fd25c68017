//! Discord side of the relay: builds webhook payloads from SNS alarm messages
//! and delivers them.

pub mod discord;
pub mod payload;

pub use discord::DiscordClient;
pub use payload::{DiscordMessage, build_payload};
