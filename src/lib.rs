//!
//! # nanosci-tracker
//!
//! Multi-object visual tracker for microscopy-style video. Many small, visually
//! similar particles move across a large field of view; the field is decomposed
//! into spatially overlapping [Scene](scene::Scene)s that are tracked
//! independently, and a global [World](world::World) fuses their outputs into a
//! single, identity-stable set of tracks.
//!
//! The crate owns the *tracking and identity-management engine*: the per-scene
//! local tracker (blob detection + short-term tracking + a four-feature
//! appearance model) and the global coordinator that maintains the
//! current/new/out-of-scene/dead track populations and re-identifies objects
//! across scenes and across time.
//!
//! Dataset decoding, the blob detector's image operations (Otsu thresholding,
//! morphological dilation, connected-component labeling), the short-term
//! tracker (KCF or similar) and the HOG descriptor computation are external
//! collaborators: this crate defines the abstract contracts in [external] and
//! consumes them.
//!
//! ## Performance
//!
//! Scenes are logically independent (disjoint ROIs, disjoint track ownership)
//! and are advanced in parallel with [rayon](https://docs.rs/rayon); the world
//! fusion step observes all scene results before running the matcher, per the
//! single-barrier-per-frame contract.

pub mod config;
pub mod distance;
pub mod external;
pub mod features;
pub mod geometry;
pub mod matcher;
pub mod scene;
pub mod tracer;
pub mod track;
pub mod world;

/// Deterministic test doubles and synthetic data generators, used by this
/// crate's own unit tests and by `tests/scenarios.rs`. Not gated behind
/// `cfg(test)` so integration tests can reach it, same as upstream
/// tracking libraries expose a `test_stuff`/`testkit` module unconditionally.
pub mod test_stuff;

use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// `ConfigInvalid` and `DatasetNotFound`/`DatasetDecode` are the only
/// variants a caller should expect to observe as a propagated `Err` — they
/// are fatal at startup. `FeatureInitFailed` is recorded on the affected
/// track (the feature is disabled, contributing similarity 0) rather than
/// propagated. `TrackerInitRejected` and `TrackerLost` are internal control
/// flow, never constructed as errors.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("configuration is invalid: {0}")]
    ConfigInvalid(String),
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),
    #[error("dataset could not be decoded: {0}")]
    DatasetDecode(String),
    #[error("feature failed to initialise: {0}")]
    FeatureInitFailed(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Floating point epsilon used throughout the test suite.
#[cfg(test)]
pub(crate) const EPS: f32 = 0.00001;
