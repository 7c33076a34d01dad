//! Terminal "game renderer" module.
//!
//! Renders a [`core::GameSnapshot`] into a simple framebuffer that is then
//! flushed to the terminal with crossterm. No widgets or layout engine.
//!
//! - [`fb`]: styled character grid
//! - [`game_view`]: snapshot to framebuffer (pure, testable)
//! - [`renderer`]: framebuffer to terminal, full or diffed

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use moldrop_core as core;
pub use moldrop_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
