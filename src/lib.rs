//! Moldrop (workspace facade crate).
//!
//! Re-exports the member crates under `crates/` as
//! `moldrop::{adapter,core,input,term,types}`.

pub use moldrop_adapter as adapter;
pub use moldrop_core as core;
pub use moldrop_input as input;
pub use moldrop_term as term;
pub use moldrop_types as types;
