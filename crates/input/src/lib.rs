//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`] and keeps
//! soft drop consistent on terminals without key-release events.

pub mod handler;
pub mod map;

pub use moldrop_types as types;

pub use handler::{SoftDropLatch, SOFT_DROP_GRACE_MS};
pub use map::{handle_key_event, should_quit};
