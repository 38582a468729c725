//! Game Events
//!
//! Events generated by the match state machine for broadcast and
//! verification. A settle produces at most a handful of these, so no
//! ordering machinery is needed: they come out in emission order.

use serde::{Deserialize, Serialize};

use crate::game::stone::{StoneId, Team};

/// Why a match resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// One side ran out of stones after a settle.
    Knockout,
    /// A participant left or disconnected mid-match.
    Abandon,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Both participants readied up; the board is laid out and the
    /// opening turn has been drawn.
    MatchStarted {
        /// Team holding the opening turn
        turn: Team,
    },

    /// A stone left the board during simulation.
    StoneEliminated {
        /// The eliminated stone
        stone_id: StoneId,
        /// Team that lost the stone
        team: Team,
    },

    /// A settle finished with both sides still standing.
    TurnChanged {
        /// Team now holding the turn
        turn: Team,
    },

    /// The match is over.
    MatchResolved {
        /// Winning team
        winner: Team,
        /// How the match ended
        reason: EndReason,
    },
}

/// A game event with the tick it occurred on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when the event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a match started event.
    pub fn match_started(tick: u32, turn: Team) -> Self {
        Self {
            tick,
            data: GameEventData::MatchStarted { turn },
        }
    }

    /// Create a stone eliminated event.
    pub fn stone_eliminated(tick: u32, stone_id: StoneId, team: Team) -> Self {
        Self {
            tick,
            data: GameEventData::StoneEliminated { stone_id, team },
        }
    }

    /// Create a turn changed event.
    pub fn turn_changed(tick: u32, turn: Team) -> Self {
        Self {
            tick,
            data: GameEventData::TurnChanged { turn },
        }
    }

    /// Create a match resolved event.
    pub fn match_resolved(tick: u32, winner: Team, reason: EndReason) -> Self {
        Self {
            tick,
            data: GameEventData::MatchResolved { winner, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_constructors() {
        let started = GameEvent::match_started(0, Team::Dog);
        assert_eq!(started.tick, 0);
        assert_eq!(started.data, GameEventData::MatchStarted { turn: Team::Dog });

        let out = GameEvent::stone_eliminated(42, StoneId(3), Team::Cat);
        assert_eq!(out.tick, 42);

        let resolved = GameEvent::match_resolved(100, Team::Cat, EndReason::Abandon);
        assert_eq!(
            resolved.data,
            GameEventData::MatchResolved {
                winner: Team::Cat,
                reason: EndReason::Abandon
            }
        );
    }

    #[test]
    fn test_event_json_roundtrip() {
        let event = GameEvent::turn_changed(7, Team::Dog);
        let json = serde_json::to_string(&event).unwrap();
        let parsed: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
