//! Novel Engine — route-weighted progression for visual novels.
//!
//! Tracks the player and their route affinity scores, and decides which
//! authored scene comes next by weighting the leading route against the
//! main story track.

pub mod core;
pub mod schema;
