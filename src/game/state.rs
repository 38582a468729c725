//! Match State Machine
//!
//! Tracks whose turn it is, validates and applies shots, and evaluates
//! the win condition once the board settles.
//!
//! ```text
//! Forming ──ready×2──▶ AwaitingShot ──valid shot──▶ Simulating
//!                          ▲                            │ settle
//!                          └──── both sides alive ──────┤
//!                                                       ▼
//!                                              Resolved { winner }
//! ```
//!
//! Invalid shot commands are rejected silently: no state change, no
//! event. Rejection deliberately produces no response at all, so the
//! command stream gives an attacker no side channel.

use crate::core::fixed::{fixed_clamp, MAX_SHOT_SPEED};
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::game::events::{EndReason, GameEvent};
use crate::game::physics;
use crate::game::stone::{starting_layout, Stone, StoneId, Team};

/// Current phase of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    /// Waiting for two participants and mutual readiness.
    Forming,
    /// Turn owner may submit exactly one shot.
    AwaitingShot,
    /// The scheduler is driving physics steps; shots are not accepted.
    Simulating,
    /// Terminal. No further commands are accepted.
    Resolved {
        /// Winning team
        winner: Team,
    },
}

/// What one state-machine step produced.
#[derive(Debug, Default)]
pub struct StepReport {
    /// Elimination events from this tick.
    pub events: Vec<GameEvent>,
    /// Whether the board has converged to stillness.
    pub at_rest: bool,
}

/// Complete authoritative state of one match.
///
/// Stones live in a fixed `Vec` in creation order; elimination flips a
/// flag but never removes, so ids stay stable and counts reconcile.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Match identifier
    pub match_id: [u8; 16],

    /// Physics ticks elapsed across all simulation runs
    pub tick: u32,

    /// Current phase
    pub phase: MatchPhase,

    /// Team currently holding the turn. Meaningful from the first
    /// `start()` onward; alternates only on a settle that does not end
    /// the match.
    pub turn: Team,

    /// All ten stones (empty until `start()`)
    pub stones: Vec<Stone>,

    /// Seed the opening coin flip was drawn from (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG
    rng: DeterministicRng,
}

impl MatchState {
    /// Create a match in the `Forming` phase.
    pub fn new(match_id: [u8; 16]) -> Self {
        Self {
            match_id,
            tick: 0,
            phase: MatchPhase::Forming,
            turn: Team::Cat,
            stones: Vec::new(),
            rng_seed: 0,
            rng: DeterministicRng::new(0),
        }
    }

    /// Start the match: lay out the stones and draw the opening turn.
    ///
    /// The caller supplies the derived match seed (see
    /// `core::rng::derive_match_seed`); the unbiased coin flip comes
    /// from it so replays of the same match open identically.
    pub fn start(&mut self, rng_seed: u64) -> GameEvent {
        debug_assert!(
            matches!(self.phase, MatchPhase::Forming),
            "start() outside Forming"
        );

        self.rng_seed = rng_seed;
        self.rng = DeterministicRng::new(rng_seed);
        self.stones = starting_layout();
        self.turn = if self.rng.coin_flip() {
            Team::Cat
        } else {
            Team::Dog
        };
        self.phase = MatchPhase::AwaitingShot;

        GameEvent::match_started(self.tick, self.turn)
    }

    /// Validate and apply a shot command.
    ///
    /// Returns `false` - leaving every stone and the phase untouched -
    /// unless all of: the phase is `AwaitingShot`, `team` holds the
    /// turn, the stone exists, is in play, and belongs to `team`. On
    /// acceptance the stone's velocity is set to the impulse (each
    /// component clamped to the legal shot range) and the phase moves
    /// to `Simulating`.
    pub fn try_shoot(&mut self, team: Team, stone_id: StoneId, impulse: FixedVec2) -> bool {
        if self.phase != MatchPhase::AwaitingShot {
            return false;
        }
        if team != self.turn {
            return false;
        }
        let Some(stone) = self.stones.iter_mut().find(|s| s.id == stone_id) else {
            return false;
        };
        if stone.out || stone.team != team {
            return false;
        }

        stone.velocity = FixedVec2::new(
            fixed_clamp(impulse.x, -MAX_SHOT_SPEED, MAX_SHOT_SPEED),
            fixed_clamp(impulse.y, -MAX_SHOT_SPEED, MAX_SHOT_SPEED),
        );
        self.phase = MatchPhase::Simulating;
        true
    }

    /// Run one physics step. Only valid while `Simulating`.
    pub fn step(&mut self) -> StepReport {
        debug_assert!(
            matches!(self.phase, MatchPhase::Simulating),
            "step() outside Simulating"
        );

        self.tick = self.tick.wrapping_add(1);
        let outcome = physics::step(&mut self.stones);

        let events = outcome
            .newly_out
            .iter()
            .filter_map(|id| {
                self.stones
                    .iter()
                    .find(|s| s.id == *id)
                    .map(|s| GameEvent::stone_eliminated(self.tick, s.id, s.team))
            })
            .collect();

        StepReport {
            events,
            at_rest: physics::at_rest(&self.stones),
        }
    }

    /// Zero every velocity, forcing rest. Used by the scheduler when a
    /// simulation run hits the tick ceiling.
    pub fn force_rest(&mut self) {
        for stone in &mut self.stones {
            stone.velocity = FixedVec2::ZERO;
        }
    }

    /// Evaluate the board after a settle and advance the turn cycle.
    ///
    /// One side out of stones hands the win to the other. If the settle
    /// wiped out both sides at once, the win goes to the team that did
    /// NOT own the triggering turn. Otherwise the turn flips and the
    /// match continues.
    pub fn resolve_settled(&mut self) -> GameEvent {
        debug_assert!(
            matches!(self.phase, MatchPhase::Simulating),
            "resolve_settled() outside Simulating"
        );

        let (cat, dog) = self.stones_in_play();
        let winner = match (cat, dog) {
            (0, 0) => Some(self.turn.opponent()),
            (0, _) => Some(Team::Dog),
            (_, 0) => Some(Team::Cat),
            _ => None,
        };

        match winner {
            Some(team) => {
                self.phase = MatchPhase::Resolved { winner: team };
                GameEvent::match_resolved(self.tick, team, EndReason::Knockout)
            }
            None => {
                self.turn = self.turn.opponent();
                self.phase = MatchPhase::AwaitingShot;
                GameEvent::turn_changed(self.tick, self.turn)
            }
        }
    }

    /// Resolve the match because a participant abandoned it. The
    /// remaining team wins regardless of the board.
    pub fn resolve_abandoned(&mut self, leaver: Team) -> GameEvent {
        let winner = leaver.opponent();
        self.phase = MatchPhase::Resolved { winner };
        GameEvent::match_resolved(self.tick, winner, EndReason::Abandon)
    }

    /// Count of in-play stones per team, `(cat, dog)`.
    pub fn stones_in_play(&self) -> (u32, u32) {
        let mut cat = 0;
        let mut dog = 0;
        for stone in self.stones.iter().filter(|s| s.in_play()) {
            match stone.team {
                Team::Cat => cat += 1,
                Team::Dog => dog += 1,
            }
        }
        (cat, dog)
    }

    /// Winner, once resolved.
    pub fn winner(&self) -> Option<Team> {
        match self.phase {
            MatchPhase::Resolved { winner } => Some(winner),
            _ => None,
        }
    }

    /// Has the match reached its terminal phase?
    pub fn is_resolved(&self) -> bool {
        matches!(self.phase, MatchPhase::Resolved { .. })
    }

    /// Compute the hash of the current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            for stone in &self.stones {
                stone.hash_into(hasher);
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
