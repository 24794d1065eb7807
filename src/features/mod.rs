//! Four per-object appearance/motion descriptors: a color/gray
//! [Histogram](histogram::Histogram), a [HOG](hog::Hog) vector, a
//! [MOSSE](mosse::Mosse) correlation filter, and a moving-average
//! [Velocity](velocity::Velocity). Each is stored as an `Option<T>` "feature
//! slot" on [Track](crate::track::Track) — `None` means "disabled", either
//! because it was never initialised or because initialisation failed; a
//! disabled feature contributes similarity `0.0` in the matcher rather than
//! failing the whole comparison.

pub mod histogram;
pub mod hog;
pub mod mosse;
pub mod spectrum;
pub mod velocity;

pub use histogram::Histogram;
pub use hog::Hog;
pub use mosse::Mosse;
pub use velocity::Velocity;
