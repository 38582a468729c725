//! Rooms and the Match Registry
//!
//! A `MatchRoom` binds two participants to the two team slots of one
//! authoritative `MatchState` and owns the handle of that match's
//! simulation task. The `MatchRegistry` is the explicit, process-owned
//! table of rooms - created once and injected into the transport layer,
//! never reached through ambient global state.

use std::collections::BTreeMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::core::rng::derive_match_seed;
use crate::core::vec2::FixedVec2;
use crate::game::events::{EndReason, GameEvent};
use crate::game::state::{MatchPhase, MatchState, StepReport};
use crate::game::stone::{StoneId, Team};
use crate::network::protocol::{
    BoardState, MatchEndInfo, MatchStartInfo, RoomPlayer, RoomStatus, ServerMessage, StoneUpdate,
};

/// Short shareable room code.
pub type RoomCode = String;

/// Unique player identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Mint a fresh id for a new connection.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Convert to UUID string for logs.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }
}

/// A participant bound to one of the two slots.
#[derive(Debug)]
pub struct Participant {
    /// Player identifier.
    pub player_id: PlayerId,
    /// Ready to start?
    pub ready: bool,
    /// Message channel to this player.
    pub sender: mpsc::Sender<ServerMessage>,
}

/// Room errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RoomError {
    /// Room already has two players.
    #[error("Room is full")]
    RoomFull,

    /// Player already in the room.
    #[error("Already in room")]
    AlreadyInRoom,

    /// Match has already started.
    #[error("Match in progress")]
    MatchInProgress,

    /// Both players must be ready.
    #[error("Players not ready")]
    PlayersNotReady,

    /// Operation not valid in the current phase.
    #[error("Invalid room phase")]
    InvalidPhase,

    /// Player not found in this room.
    #[error("Player not found")]
    PlayerNotFound,
}

/// A match room: two participant slots plus the authoritative state.
///
/// Slot 0 plays Cat, slot 1 plays Dog. The shot path and the simulation
/// loop both go through the room's single `RwLock`, so a shot arriving
/// concurrently with a phase transition always sees one consistent
/// phase - there is no separate check-then-act window.
pub struct MatchRoom {
    /// Shareable room code.
    pub code: RoomCode,
    /// Match identifier.
    match_id: [u8; 16],
    /// The two participant slots.
    slots: [Option<Participant>; 2],
    /// Authoritative match state.
    state: MatchState,
    /// Handle of the running simulation loop, if any. At most one loop
    /// exists per room; holding the handle here is both the re-entrancy
    /// guard and the cancel point.
    sim_task: Option<JoinHandle<()>>,
}

impl MatchRoom {
    /// Create an empty room.
    pub fn new(code: RoomCode) -> Self {
        let match_id = uuid::Uuid::new_v4().into_bytes();
        Self {
            code,
            match_id,
            slots: [None, None],
            state: MatchState::new(match_id),
            sim_task: None,
        }
    }

    /// Match identifier.
    pub fn match_id(&self) -> [u8; 16] {
        self.match_id
    }

    /// Read access to the match state (tests, snapshots).
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Add a player to the first free slot. Only possible while forming.
    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        sender: mpsc::Sender<ServerMessage>,
    ) -> Result<usize, RoomError> {
        if !matches!(self.state.phase, MatchPhase::Forming) {
            return Err(RoomError::MatchInProgress);
        }
        if self.contains(&player_id) {
            return Err(RoomError::AlreadyInRoom);
        }

        let slot = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(RoomError::RoomFull)?;

        self.slots[slot] = Some(Participant {
            player_id,
            ready: false,
            sender,
        });
        Ok(slot)
    }

    /// Remove a player. Returns the vacated slot.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Option<usize> {
        let slot = self.slot_of(player_id)?;
        self.slots[slot] = None;
        Some(slot)
    }

    /// Is this player in the room?
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.slot_of(player_id).is_some()
    }

    /// Slot index of a player.
    pub fn slot_of(&self, player_id: &PlayerId) -> Option<usize> {
        self.slots.iter().position(|s| {
            s.as_ref()
                .map(|p| p.player_id == *player_id)
                .unwrap_or(false)
        })
    }

    /// Team a player is bound to.
    pub fn team_of(&self, player_id: &PlayerId) -> Option<Team> {
        Team::from_slot(self.slot_of(player_id)?)
    }

    /// Ids of everyone currently in the room.
    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.slots
            .iter()
            .flatten()
            .map(|p| p.player_id)
            .collect()
    }

    /// Number of occupied slots.
    pub fn player_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Is the room empty?
    pub fn is_empty(&self) -> bool {
        self.player_count() == 0
    }

    /// Toggle a player's readiness. Returns the new value.
    pub fn toggle_ready(&mut self, player_id: &PlayerId) -> Result<bool, RoomError> {
        let slot = self.slot_of(player_id).ok_or(RoomError::PlayerNotFound)?;
        let participant = self.slots[slot].as_mut().ok_or(RoomError::PlayerNotFound)?;
        participant.ready = !participant.ready;
        Ok(participant.ready)
    }

    /// Both slots filled and both players ready?
    pub fn all_ready(&self) -> bool {
        self.slots.iter().all(|s| s.as_ref().is_some_and(|p| p.ready))
    }

    /// Start the match: derive the seed from server entropy plus the
    /// sorted participant ids, lay out the board, flip for the turn.
    pub fn start_match(&mut self, entropy: &[u8; 32]) -> Result<GameEvent, RoomError> {
        if !matches!(self.state.phase, MatchPhase::Forming) {
            return Err(RoomError::InvalidPhase);
        }
        if !self.all_ready() {
            return Err(RoomError::PlayersNotReady);
        }

        let mut player_ids: Vec<[u8; 16]> =
            self.member_ids().iter().map(|id| id.0).collect();
        player_ids.sort();
        let seed = derive_match_seed(entropy, &self.match_id, &player_ids);

        Ok(self.state.start(seed))
    }

    /// Validate and apply a shot from this player.
    ///
    /// Returns `false` (and mutates nothing) for anything invalid:
    /// unknown player, off-turn shot, foreign or eliminated stone, or a
    /// shot while the board is still moving.
    pub fn try_shoot(&mut self, player_id: &PlayerId, stone_id: u8, impulse: [i32; 2]) -> bool {
        let Some(team) = self.team_of(player_id) else {
            return false;
        };
        self.state.try_shoot(
            team,
            StoneId(stone_id),
            FixedVec2::new(impulse[0], impulse[1]),
        )
    }

    /// Run one simulation tick. Returns `None` unless simulating.
    pub fn run_tick(&mut self) -> Option<StepReport> {
        if !matches!(self.state.phase, MatchPhase::Simulating) {
            return None;
        }
        Some(self.state.step())
    }

    /// Resolve the settle. `forced` zeroes all velocities first (tick
    /// ceiling overrun).
    pub fn settle(&mut self, forced: bool) -> GameEvent {
        if forced {
            self.state.force_rest();
        }
        self.state.resolve_settled()
    }

    /// Resolve the match because this player abandoned it.
    pub fn resolve_abandoned(&mut self, player_id: &PlayerId) -> Option<GameEvent> {
        let team = self.team_of(player_id)?;
        Some(self.state.resolve_abandoned(team))
    }

    /// Room membership snapshot for broadcast.
    pub fn room_status(&self) -> RoomStatus {
        RoomStatus {
            code: self.code.clone(),
            players: self
                .slots
                .iter()
                .enumerate()
                .filter_map(|(slot, s)| {
                    s.as_ref().map(|p| RoomPlayer {
                        player_id: p.player_id.0,
                        slot: slot as u8,
                        ready: p.ready,
                    })
                })
                .collect(),
        }
    }

    /// Match start message for broadcast.
    pub fn start_info(&self) -> MatchStartInfo {
        MatchStartInfo {
            match_id: self.match_id,
            rng_seed: self.state.rng_seed,
            turn: self.state.turn,
            stones: self.state.stones.iter().map(StoneUpdate::from).collect(),
        }
    }

    /// Board snapshot for broadcast.
    pub fn board_snapshot(&self) -> BoardState {
        BoardState {
            tick: self.state.tick,
            stones: self.state.stones.iter().map(StoneUpdate::from).collect(),
            state_hash: self.state.compute_hash(),
        }
    }

    /// Match end message for a resolved match.
    pub fn match_end_info(&self, winner: Team, reason: EndReason) -> MatchEndInfo {
        MatchEndInfo {
            match_id: self.match_id,
            winner_slot: winner.slot() as u8,
            winner_team: winner,
            reason,
            end_tick: self.state.tick,
            final_state_hash: self.state.compute_hash(),
        }
    }

    /// Broadcast a message to everyone in the room.
    pub async fn broadcast(&self, message: ServerMessage) {
        for participant in self.slots.iter().flatten() {
            let _ = participant.sender.send(message.clone()).await;
        }
    }

    /// Is a simulation loop registered for this room?
    pub fn sim_running(&self) -> bool {
        self.sim_task.is_some()
    }

    /// Register the simulation loop's handle. Refuses a second loop.
    pub fn set_sim_task(&mut self, handle: JoinHandle<()>) -> bool {
        if self.sim_task.is_some() {
            return false;
        }
        self.sim_task = Some(handle);
        true
    }

    /// Take the simulation handle (to abort it or after the loop ends).
    pub fn clear_sim_task(&mut self) -> Option<JoinHandle<()>> {
        self.sim_task.take()
    }
}

// =============================================================================
// MATCH REGISTRY
// =============================================================================

/// Process-owned table of active rooms.
///
/// Created by the server on startup and injected into the connection
/// handlers; every room reachable in the process lives here.
pub struct MatchRegistry {
    /// Active rooms by code.
    rooms: RwLock<BTreeMap<RoomCode, Arc<RwLock<MatchRoom>>>>,
    /// Player to room mapping.
    player_rooms: RwLock<BTreeMap<PlayerId, RoomCode>>,
}

impl MatchRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(BTreeMap::new()),
            player_rooms: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a new room and return its code and handle.
    pub async fn create_room(&self) -> (RoomCode, Arc<RwLock<MatchRoom>>) {
        let mut rooms = self.rooms.write().await;

        let code = loop {
            let candidate = generate_room_code();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let room = Arc::new(RwLock::new(MatchRoom::new(code.clone())));
        rooms.insert(code.clone(), room.clone());
        (code, room)
    }

    /// Look up a room by code.
    pub async fn get(&self, code: &str) -> Option<Arc<RwLock<MatchRoom>>> {
        let rooms = self.rooms.read().await;
        rooms.get(code).cloned()
    }

    /// Room a player is registered in.
    pub async fn player_room(&self, player_id: &PlayerId) -> Option<Arc<RwLock<MatchRoom>>> {
        let code = {
            let player_rooms = self.player_rooms.read().await;
            player_rooms.get(player_id).cloned()
        };
        match code {
            Some(code) => self.get(&code).await,
            None => None,
        }
    }

    /// Record which room a player is in.
    pub async fn register_player(&self, player_id: PlayerId, code: RoomCode) {
        let mut player_rooms = self.player_rooms.write().await;
        player_rooms.insert(player_id, code);
    }

    /// Forget a player's room binding.
    pub async fn unregister_player(&self, player_id: &PlayerId) {
        let mut player_rooms = self.player_rooms.write().await;
        player_rooms.remove(player_id);
    }

    /// Destroy a room and unbind all of its members.
    pub async fn destroy(&self, code: &str) {
        let room = {
            let mut rooms = self.rooms.write().await;
            rooms.remove(code)
        };

        if let Some(room) = room {
            let members = room.read().await.member_ids();
            let mut player_rooms = self.player_rooms.write().await;
            for player_id in members {
                player_rooms.remove(&player_id);
            }
        }
    }

    /// Number of active rooms.
    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }

    /// Sweep resolved or abandoned-empty rooms that escaped eager
    /// teardown.
    pub async fn cleanup(&self) {
        let mut rooms = self.rooms.write().await;
        let mut to_remove = Vec::new();

        for (code, room) in rooms.iter() {
            let r = room.read().await;
            if r.state().is_resolved() || r.is_empty() {
                to_remove.push(code.clone());
            }
        }

        for code in to_remove {
            rooms.remove(&code);
        }
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Five-character shareable room code, derived from a fresh UUID.
fn generate_room_code() -> RoomCode {
    let id = uuid::Uuid::new_v4();
    id.simple().to_string()[..5].to_uppercase()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;
    use crate::game::events::GameEventData;

    const ENTROPY: [u8; 32] = [42; 32];

    fn test_room() -> MatchRoom {
        MatchRoom::new("TESTS".to_string())
    }

    fn filled_room() -> (MatchRoom, PlayerId, PlayerId) {
        let mut room = test_room();
        let p1 = PlayerId::new([1; 16]);
        let p2 = PlayerId::new([2; 16]);
        let (tx1, _rx1) = mpsc::channel(16);
        let (tx2, _rx2) = mpsc::channel(16);
        room.add_player(p1, tx1).unwrap();
        room.add_player(p2, tx2).unwrap();
        (room, p1, p2)
    }

    fn started_room() -> (MatchRoom, PlayerId, PlayerId) {
        let (mut room, p1, p2) = filled_room();
        room.toggle_ready(&p1).unwrap();
        room.toggle_ready(&p2).unwrap();
        room.start_match(&ENTROPY).unwrap();
        (room, p1, p2)
    }

    /// The player currently holding the turn.
    fn turn_holder(room: &MatchRoom, p1: PlayerId, p2: PlayerId) -> PlayerId {
        if room.team_of(&p1) == Some(room.state().turn) {
            p1
        } else {
            p2
        }
    }

    /// First in-play stone id owned by this player's team.
    fn own_stone(room: &MatchRoom, player: &PlayerId) -> u8 {
        let team = room.team_of(player).unwrap();
        room.state()
            .stones
            .iter()
            .find(|s| s.team == team && s.in_play())
            .map(|s| s.id.0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_remove_player() {
        let mut room = test_room();
        let player_id = PlayerId::new([1; 16]);
        let (tx, _rx) = mpsc::channel(16);

        let slot = room.add_player(player_id, tx).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(room.team_of(&player_id), Some(Team::Cat));
        assert_eq!(room.player_count(), 1);

        assert_eq!(room.remove_player(&player_id), Some(0));
        assert!(room.is_empty());
    }

    #[tokio::test]
    async fn test_room_full() {
        let (mut room, _, _) = filled_room();

        let extra = PlayerId::new([99; 16]);
        let (tx, _rx) = mpsc::channel(16);
        let result = room.add_player(extra, tx);
        assert!(matches!(result, Err(RoomError::RoomFull)));
    }

    #[tokio::test]
    async fn test_duplicate_join_rejected() {
        let mut room = test_room();
        let player_id = PlayerId::new([1; 16]);
        let (tx1, _rx1) = mpsc::channel(16);
        let (tx2, _rx2) = mpsc::channel(16);

        room.add_player(player_id, tx1).unwrap();
        let result = room.add_player(player_id, tx2);
        assert!(matches!(result, Err(RoomError::AlreadyInRoom)));
    }

    #[tokio::test]
    async fn test_slots_map_to_teams() {
        let (room, p1, p2) = filled_room();
        assert_eq!(room.team_of(&p1), Some(Team::Cat));
        assert_eq!(room.team_of(&p2), Some(Team::Dog));
        assert_eq!(room.team_of(&PlayerId::new([9; 16])), None);
    }

    #[tokio::test]
    async fn test_ready_toggles() {
        let (mut room, p1, p2) = filled_room();

        assert!(!room.all_ready());
        assert!(room.toggle_ready(&p1).unwrap());
        assert!(!room.all_ready());
        assert!(room.toggle_ready(&p2).unwrap());
        assert!(room.all_ready());

        // Toggling again withdraws readiness, as in the lobby flow
        assert!(!room.toggle_ready(&p1).unwrap());
        assert!(!room.all_ready());
    }

    #[tokio::test]
    async fn test_cannot_start_without_ready() {
        let (mut room, _, _) = filled_room();
        let result = room.start_match(&ENTROPY);
        assert!(matches!(result, Err(RoomError::PlayersNotReady)));
    }

    #[tokio::test]
    async fn test_start_match() {
        let (room, _, _) = started_room();

        assert_eq!(room.state().phase, MatchPhase::AwaitingShot);
        assert_eq!(room.state().stones.len(), 10);

        let info = room.start_info();
        assert_eq!(info.stones.len(), 10);
        assert_eq!(info.turn, room.state().turn);
        assert_ne!(info.rng_seed, 0);
    }

    #[tokio::test]
    async fn test_cannot_join_started_match() {
        let (mut room, _, p2) = started_room();
        room.remove_player(&p2);

        let late = PlayerId::new([50; 16]);
        let (tx, _rx) = mpsc::channel(16);
        let result = room.add_player(late, tx);
        assert!(matches!(result, Err(RoomError::MatchInProgress)));
    }

    #[tokio::test]
    async fn test_shot_routing_and_validation() {
        let (mut room, p1, p2) = started_room();
        let shooter = turn_holder(&room, p1, p2);
        let waiter = if shooter == p1 { p2 } else { p1 };

        // Off-turn player: silently rejected
        let stone = own_stone(&room, &waiter);
        assert!(!room.try_shoot(&waiter, stone, [to_fixed(5.0), 0]));
        assert_eq!(room.state().phase, MatchPhase::AwaitingShot);

        // Stranger: silently rejected
        assert!(!room.try_shoot(&PlayerId::new([77; 16]), 0, [to_fixed(5.0), 0]));

        // Turn holder with own stone: accepted
        let stone = own_stone(&room, &shooter);
        assert!(room.try_shoot(&shooter, stone, [to_fixed(0.5), 0]));
        assert_eq!(room.state().phase, MatchPhase::Simulating);

        // Re-entry while simulating: silently rejected
        assert!(!room.try_shoot(&shooter, stone, [to_fixed(5.0), 0]));
    }

    #[tokio::test]
    async fn test_run_tick_and_settle() {
        let (mut room, p1, p2) = started_room();
        let shooter = turn_holder(&room, p1, p2);
        let before = room.state().turn;

        let stone = own_stone(&room, &shooter);
        assert!(room.try_shoot(&shooter, stone, [to_fixed(0.5), 0]));

        // No tick outside Simulating would run; drive to rest
        let mut ticks = 0u32;
        loop {
            let report = room.run_tick().expect("tick while simulating");
            ticks += 1;
            if report.at_rest {
                break;
            }
            assert!(ticks < 8000, "never settled");
        }

        let event = room.settle(false);
        assert!(matches!(event.data, GameEventData::TurnChanged { .. }));
        assert_eq!(room.state().turn, before.opponent());
        assert_eq!(room.state().phase, MatchPhase::AwaitingShot);

        // Outside Simulating, run_tick refuses
        assert!(room.run_tick().is_none());
    }

    #[tokio::test]
    async fn test_abandon_gives_opponent_the_win() {
        let (mut room, p1, p2) = started_room();

        let event = room.resolve_abandoned(&p1).unwrap();
        let p2_team = room.team_of(&p2).unwrap();
        assert_eq!(room.state().winner(), Some(p2_team));
        assert!(matches!(
            event.data,
            GameEventData::MatchResolved {
                reason: EndReason::Abandon,
                ..
            }
        ));

        let info = room.match_end_info(p2_team, EndReason::Abandon);
        assert_eq!(info.winner_slot, p2_team.slot() as u8);
    }

    #[tokio::test]
    async fn test_board_snapshot_shape() {
        let (room, _, _) = started_room();
        let snapshot = room.board_snapshot();

        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.stones.len(), 10);
        assert!(snapshot.stones.iter().all(|s| !s.out));
        assert_eq!(snapshot.state_hash, room.state().compute_hash());
    }

    #[tokio::test]
    async fn test_sim_task_guard() {
        let (mut room, _, _) = started_room();
        assert!(!room.sim_running());

        let handle = tokio::spawn(async {});
        assert!(room.set_sim_task(handle));
        assert!(room.sim_running());

        // Second registration refused
        let second = tokio::spawn(async {});
        assert!(!room.set_sim_task(second));

        let taken = room.clear_sim_task().unwrap();
        taken.abort();
        assert!(!room.sim_running());
    }

    #[tokio::test]
    async fn test_registry_create_get_destroy() {
        let registry = MatchRegistry::new();

        let (code, _room) = registry.create_room().await;
        assert_eq!(code.len(), 5);
        assert_eq!(registry.room_count().await, 1);
        assert!(registry.get(&code).await.is_some());
        assert!(registry.get("ZZZZZ").await.is_none());

        registry.destroy(&code).await;
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_registry_player_mapping() {
        let registry = MatchRegistry::new();
        let (code, room) = registry.create_room().await;
        let player_id = PlayerId::new([1; 16]);
        let (tx, _rx) = mpsc::channel(16);

        room.write().await.add_player(player_id, tx).unwrap();
        registry.register_player(player_id, code.clone()).await;

        assert!(registry.player_room(&player_id).await.is_some());

        // Destroying the room unbinds its members too
        registry.destroy(&code).await;
        assert!(registry.player_room(&player_id).await.is_none());
    }

    #[tokio::test]
    async fn test_registry_cleanup_sweeps_dead_rooms() {
        let registry = MatchRegistry::new();

        // Empty room
        let (_empty_code, _) = registry.create_room().await;

        // Resolved room
        let (_done_code, done_room) = registry.create_room().await;
        {
            let mut r = done_room.write().await;
            let p1 = PlayerId::new([1; 16]);
            let p2 = PlayerId::new([2; 16]);
            let (tx1, _rx1) = mpsc::channel(16);
            let (tx2, _rx2) = mpsc::channel(16);
            r.add_player(p1, tx1).unwrap();
            r.add_player(p2, tx2).unwrap();
            r.toggle_ready(&p1).unwrap();
            r.toggle_ready(&p2).unwrap();
            r.start_match(&ENTROPY).unwrap();
            r.resolve_abandoned(&p1).unwrap();
        }

        assert_eq!(registry.room_count().await, 2);
        registry.cleanup().await;
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_both_players() {
        let mut room = test_room();
        let p1 = PlayerId::new([1; 16]);
        let p2 = PlayerId::new([2; 16]);
        let (tx1, mut rx1) = mpsc::channel(16);
        let (tx2, mut rx2) = mpsc::channel(16);
        room.add_player(p1, tx1).unwrap();
        room.add_player(p2, tx2).unwrap();

        room.broadcast(ServerMessage::TurnChange { turn: Team::Cat })
            .await;

        assert!(matches!(
            rx1.recv().await,
            Some(ServerMessage::TurnChange { turn: Team::Cat })
        ));
        assert!(matches!(
            rx2.recv().await,
            Some(ServerMessage::TurnChange { turn: Team::Cat })
        ));
    }
}
