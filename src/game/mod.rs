//! Match Simulation Module
//!
//! All game logic. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `stone`: teams, stones, the fixed starting layout
//! - `physics`: fixed-timestep integration, collisions, rest detection
//! - `state`: the per-match turn/phase state machine
//! - `events`: events produced for broadcast and verification

pub mod events;
pub mod physics;
pub mod state;
pub mod stone;

// Re-export key types
pub use events::{EndReason, GameEvent, GameEventData};
pub use physics::{any_moving, at_rest, StepOutcome};
pub use state::{MatchPhase, MatchState, StepReport};
pub use stone::{starting_layout, Stone, StoneId, Team, STONES_PER_TEAM};
