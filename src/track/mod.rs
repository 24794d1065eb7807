//! A tracked object's lifecycle: spawn, per-frame update, and the
//! NEW/CURRENT/OUT/DEAD state machine.

pub mod adapter;
pub mod label;
#[allow(clippy::module_inception)]
pub mod track;

pub use adapter::TrackAdapter;
pub use label::Label;
pub use track::{Track, TrackState, UpdateOutcome};
