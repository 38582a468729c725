//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! All messages are serialized as JSON for debugging ease,
//! with optional binary (bincode) for flat structs.

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHash;
use crate::game::events::EndReason;
use crate::game::stone::{Stone, Team};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a new room and wait for an opponent.
    CreateRoom,

    /// Join an existing room by its code.
    JoinRoom {
        /// Room code received from the room creator.
        code: String,
    },

    /// Toggle readiness. The match starts when both players are ready.
    Ready,

    /// Flick one of your stones. Silently ignored when it is not your
    /// turn, the stone is not yours, or the board is still moving.
    Shoot(ShotRequest),

    /// Leave the current room, forfeiting a running match.
    Leave,

    /// Ping for latency measurement.
    Ping {
        /// Client timestamp, echoed back.
        timestamp: u64,
    },
}

/// A shot command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShotRequest {
    /// Target stone id (0..=9).
    pub stone_id: u8,
    /// Impulse to apply, Fixed as i32 per axis.
    pub impulse: [i32; 2],
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect with the server-assigned identity.
    Welcome {
        /// Identifier for this connection's player.
        player_id: [u8; 16],
        /// Server version.
        server_version: String,
    },

    /// The room was created; share the code with your opponent.
    RoomCreated {
        /// Room code to join with.
        code: String,
    },

    /// Membership or readiness in the room changed.
    RoomUpdate(RoomStatus),

    /// The match is starting.
    MatchStart(MatchStartInfo),

    /// Board snapshot (every tick while stones are moving).
    State(BoardState),

    /// Simulation event notification.
    Event(BoardEvent),

    /// The board settled with both sides standing; the turn passed.
    TurnChange {
        /// Team now holding the turn.
        turn: Team,
    },

    /// Match over.
    MatchEnd(MatchEndInfo),

    /// Error message.
    Error(ServerError),

    /// Pong response.
    Pong {
        /// Echoed client timestamp.
        timestamp: u64,
        /// Server wall-clock millis.
        server_time: u64,
    },

    /// Server is shutting down.
    Shutdown {
        /// Human-readable reason.
        reason: String,
    },
}

/// Room membership snapshot, broadcast while forming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomStatus {
    /// Room code.
    pub code: String,
    /// Players currently in the room.
    pub players: Vec<RoomPlayer>,
}

/// One player in a forming room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPlayer {
    /// Player identifier.
    pub player_id: [u8; 16],
    /// Slot index (0 plays Cat, 1 plays Dog).
    pub slot: u8,
    /// Ready to start?
    pub ready: bool,
}

/// Information when the match starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStartInfo {
    /// Match identifier.
    pub match_id: [u8; 16],
    /// Seed the opening coin flip was drawn from (for verification).
    pub rng_seed: u64,
    /// Team holding the opening turn.
    pub turn: Team,
    /// Initial board.
    pub stones: Vec<StoneUpdate>,
}

/// Board snapshot.
///
/// Always carries all ten stones, eliminated ones included with their
/// `out` flag set, so ids stay stable and per-team counts reconcile
/// client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardState {
    /// Current tick.
    pub tick: u32,
    /// Every stone on (or knocked off) the board.
    pub stones: Vec<StoneUpdate>,
    /// State hash for verification.
    pub state_hash: StateHash,
}

/// One stone in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoneUpdate {
    /// Stone identifier.
    pub id: u8,
    /// Owning team.
    pub team: Team,
    /// Position (Fixed as i32 per axis).
    pub position: [i32; 2],
    /// Velocity (Fixed as i32 per axis).
    pub velocity: [i32; 2],
    /// Knocked off the board?
    pub out: bool,
}

impl From<&Stone> for StoneUpdate {
    fn from(stone: &Stone) -> Self {
        Self {
            id: stone.id.0,
            team: stone.team,
            position: [stone.position.x, stone.position.y],
            velocity: [stone.velocity.x, stone.velocity.y],
            out: stone.out,
        }
    }
}

/// Simulation events forwarded to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A stone left the board.
    StoneEliminated {
        /// Tick the stone went out on.
        tick: u32,
        /// The eliminated stone.
        stone_id: u8,
        /// Team that lost the stone.
        team: Team,
    },
}

/// Match end information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEndInfo {
    /// Match identifier.
    pub match_id: [u8; 16],
    /// Winning slot (0 or 1).
    pub winner_slot: u8,
    /// Winning team.
    pub winner_team: Team,
    /// How the match ended.
    pub reason: EndReason,
    /// Final tick.
    pub end_tick: u32,
    /// Final state hash.
    pub final_state_hash: StateHash,
}

/// Server error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed message.
    InvalidInput,
    /// No room with that code.
    RoomNotFound,
    /// Room already has two players.
    RoomFull,
    /// Already in a room.
    AlreadyInRoom,
    /// Not currently in a room.
    NotInRoom,
    /// Internal error.
    InternalError,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ShotRequest {
    /// Serialize to binary.
    ///
    /// Flat structs work with bincode; the tagged message enums do not,
    /// so binary frames carry bare `ShotRequest`s.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}
