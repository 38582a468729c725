//! Network Layer
//!
//! WebSocket server for real-time play. This layer is
//! **non-deterministic** - all game logic runs through `game/`.

pub mod protocol;
pub mod server;
pub mod session;

pub use protocol::{BoardState, ClientMessage, MatchEndInfo, ServerMessage, ShotRequest};
pub use server::{GameServer, GameServerError, ServerConfig};
pub use session::{MatchRegistry, MatchRoom, PlayerId, RoomCode, RoomError};
