//! # mentor_core
//!
//! Core relay logic for Mentor.
//!
//! A [`relay::ChatRelay`] maps a `(category, session id)` pair to one
//! upstream conversation held in a [`store::SessionStore`], forwards user
//! messages to it under a deadline and classifies upstream failures.

pub mod category;
pub mod config;
pub mod error;
pub mod model;
pub mod relay;
pub mod store;

pub use category::{Category, ConversationKey};
pub use config::{GenerationParams, RelayConfig};
pub use error::ChatError;
pub use relay::{ActiveSessions, ChatRelay, Reply};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
