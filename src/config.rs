//! Configuration loader, schema types and persisted player state.
//!
//! `Settings` is read-only runtime configuration; `PlayerState` is the small
//! piece of state (gain/mute, last track) written back to disk on change.

mod load;
mod schema;
mod state;

pub use schema::*;
pub use state::*;
