//! # Alkkagi Game Server
//!
//! Authoritative server for Alkkagi: two players take turns flicking stones
//! across a fixed rectangular board, trying to knock the opponent's stones
//! off the edge. The server owns all physical state; clients only submit
//! shot intents and render the snapshots broadcast back to them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ALKKAGI SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Match simulation (deterministic)          │
//! │  ├── stone.rs    - Teams, stones, starting layout            │
//! │  ├── physics.rs  - Fixed-timestep step and collisions        │
//! │  ├── state.rs    - Turn/phase state machine                  │
//! │  └── events.rs   - Simulation events                         │
//! │                                                              │
//! │  network/        - Networking (non-deterministic)            │
//! │  ├── server.rs   - WebSocket server and simulation driver    │
//! │  ├── protocol.rs - Message types                             │
//! │  └── session.rs  - Rooms and the match registry              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - Stones iterate in creation order (a fixed `Vec` of ten)
//! - No system time dependencies inside the simulation
//! - The only randomness is the seeded coin flip for the opening turn
//!
//! Given an identical starting layout and an identical sequence of accepted
//! shots, two runs produce identical tick-by-tick stone states and identical
//! state hashes on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::fixed::{Fixed, FIXED_HALF, FIXED_ONE, FIXED_SCALE};
pub use crate::core::rng::DeterministicRng;
pub use crate::core::vec2::FixedVec2;
pub use crate::game::state::{MatchPhase, MatchState};
pub use crate::game::stone::{Stone, StoneId, Team};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
