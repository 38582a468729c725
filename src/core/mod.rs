//! Core deterministic primitives.
//!
//! Everything in this module is designed for perfect cross-platform
//! determinism; the match simulation is built entirely on top of it.

pub mod fixed;
pub mod hash;
pub mod rng;
pub mod vec2;

// Re-export core types
pub use fixed::{Fixed, FIXED_HALF, FIXED_ONE, FIXED_SCALE};
pub use hash::compute_state_hash;
pub use rng::DeterministicRng;
pub use vec2::FixedVec2;
