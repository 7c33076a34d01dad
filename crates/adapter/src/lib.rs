//! Adapter module - multiplayer glue around the core engine
//!
//! Several players in one process share a [`SharedStateBus`]. Each player's
//! [`PlayerSession`] publishes a JSON [`PlayerSnapshot`] after every change,
//! sends garbage to an opponent when it clears a molecule, and pulls the
//! garbage addressed to it before every advance.
//!
//! # Keys
//!
//! ```text
//! {namespace}:player:{id}    PlayerSnapshot
//! {namespace}:garbage:{id}   last GarbageEvent sent to {id}
//! ```
//!
//! # Attacks
//!
//! Clearing a molecule of `n` atoms sends `max(1, n / 3)` rows to the
//! opponent with the highest score still in play (lowest id on ties).
//!
//! # Environment Variables
//!
//! - `MOLDROP_POOL`: JSON file with a custom molecule pool (see [`pool`])
//! - everything read by [`core::EngineConfig::from_env`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use moldrop_adapter::{PlayerProfile, PlayerSession, SharedStateBus};
//! use moldrop_adapter::core::{EngineConfig, GameSession};
//!
//! let bus = Arc::new(SharedStateBus::new("room"));
//! let session = GameSession::new(EngineConfig::default()).unwrap();
//! let mut player = PlayerSession::new(PlayerProfile::new("p1", "ada"), session, bus.clone());
//! player.start();
//!
//! assert_eq!(bus.players().len(), 1);
//! ```

pub mod bus;
pub mod player;
pub mod pool;
pub mod protocol;

pub use moldrop_core as core;
pub use moldrop_types as types;

pub use bus::{BusMessage, SharedStateBus};
pub use player::{GameOverReport, HighScoreSink, PlayerProfile, PlayerSession};
pub use pool::{config_from_env, load_pool_file, parse_pool};
pub use protocol::*;
