//! Data models for the curriculum rotor engine.
//!
//! Field names serialize as camelCase to match the web frontend.

mod rotor;
mod schedule;
mod topic;
mod view;
mod vote;

pub use rotor::*;
pub use schedule::*;
pub use topic::*;
pub use view::*;
pub use vote::*;
