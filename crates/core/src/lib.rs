//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains all the game rules, state management, and simulation logic.
//! It has **zero dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Every rule is reachable through plain method calls
//! - **Portable**: Can run in any environment (terminal, server, headless)
//!
//! # Module Structure
//!
//! - [`board`]: `width x height` grid with gravity and garbage injection
//! - [`pattern`]: line-notation parser producing a molecule's bond graph
//! - [`matcher`]: backtracking search for the best embedding of a graph in the board
//! - [`selector`]: tiered, repeat-avoiding target molecule choice
//! - [`game_state`]: the engine state machine (spawn, fall, lock, match, clear)
//! - [`session`]: fall and clear-highlight timers around the engine
//! - [`snapshot`]: read-only render view
//! - [`rng`]: seeded LCG used for every random decision
//! - [`config`]: engine configuration and validation
//!
//! # Game Rules
//!
//! - One atom (carbon or oxygen) falls at a time from the top center
//! - When it lands, the board is searched for the current target molecule
//! - A match scores one point, speeds the game up by 10% (floor 80ms), and
//!   after a short highlight its atoms vanish and columns settle
//! - The next target is checked immediately, so one drop can chain clears
//! - Opponents can push garbage rows in from the bottom
//! - The game ends when the spawn cell is blocked or garbage overflows
//!
//! # Example
//!
//! ```
//! use moldrop_core::{EngineConfig, GameEngine};
//! use moldrop_types::{Element, Molecule};
//!
//! let config = EngineConfig::default().with_custom_pool(vec![Molecule::new("ethane", "CC")]);
//! let mut engine = GameEngine::new(config).unwrap();
//! engine.start();
//!
//! engine.spawn_element(Element::Carbon);
//! engine.hard_drop();
//! engine.spawn_element(Element::Carbon);
//! engine.move_horizontal(-1);
//! let result = engine.hard_drop();
//!
//! assert!(result.matched().is_some());
//! assert_eq!(engine.score(), 1);
//! ```

pub mod board;
pub mod config;
pub mod game_state;
pub mod matcher;
pub mod pattern;
pub mod rng;
pub mod selector;
pub mod session;
pub mod snapshot;

pub use moldrop_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::{ConfigError, EngineConfig};
pub use game_state::{ActivePiece, EngineEvent, GameEngine, TickResult};
pub use matcher::{find_best_match, MatchCandidate};
pub use pattern::{parse_graph, PatternGraph};
pub use rng::SimpleRng;
pub use selector::{fallback_molecule, select_target, TargetSelector};
pub use session::GameSession;
pub use snapshot::{ActiveSnapshot, GameSnapshot};
