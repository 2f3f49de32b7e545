//! Playback engine: state machine, transport commands and position clock.
//!
//! A dedicated engine thread owns the audio output, the current [`Track`]
//! and every state transition; commands arrive over an mpsc channel and the
//! observable state is republished into a shared [`PlayerInfo`] snapshot.
//! Analysis results flow back into the same thread and are merged only when
//! their track id is still current.
//!
//! [`Track`]: crate::track::Track

mod controller;
mod sink;
mod thread;
mod types;
mod volume;

pub use controller::*;
pub use types::*;
pub use volume::*;
