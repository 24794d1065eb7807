//! The cross-scene matcher: a weighted-sum similarity, a greedy
//! per-candidate argmax assignment against a reservoir, and the
//! pre/post-cleaning passes that surround it in [World](crate::world::World)'s
//! per-frame orchestration.

pub mod cleaning;
pub mod greedy;

pub use cleaning::{post_clean, pre_clean};
pub use greedy::greedy_match;
