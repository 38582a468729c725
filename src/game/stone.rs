//! Stones and Teams
//!
//! The ten stones on the board and the fixed starting layout.
//! Stones are never removed from the collection - elimination is a flag,
//! so ids stay stable and per-team counts always reconcile.

use serde::{Deserialize, Serialize};

use crate::core::fixed::{
    Fixed, BOARD_HEIGHT, BOARD_WIDTH, LAYOUT_COLS, LAYOUT_GAP, LAYOUT_OFFSET_Y, STONE_RADIUS,
};
use crate::core::hash::StateHasher;
use crate::core::vec2::FixedVec2;

/// Number of stones each team starts with.
pub const STONES_PER_TEAM: usize = 5;

/// One of the two sides of a match.
///
/// Slot 0 always plays Cat (top of the board), slot 1 plays Dog (bottom).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Team {
    /// Top side, stone ids 0..=4
    Cat = 0,
    /// Bottom side, stone ids 5..=9
    Dog = 1,
}

impl Team {
    /// The other team.
    #[inline]
    pub fn opponent(self) -> Team {
        match self {
            Team::Cat => Team::Dog,
            Team::Dog => Team::Cat,
        }
    }

    /// Participant slot bound to this team.
    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Team bound to a participant slot. Returns `None` for slots other
    /// than 0 or 1.
    pub fn from_slot(slot: usize) -> Option<Team> {
        match slot {
            0 => Some(Team::Cat),
            1 => Some(Team::Dog),
            _ => None,
        }
    }
}

/// Stable stone identifier, unique within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoneId(pub u8);

/// A single stone on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stone {
    /// Stable identifier (never changes after creation)
    pub id: StoneId,

    /// Owning team (never changes after creation)
    pub team: Team,

    /// Center position on the board
    pub position: FixedVec2,

    /// Velocity in units per tick
    pub velocity: FixedVec2,

    /// Collision radius (never changes after creation)
    pub radius: Fixed,

    /// Knocked off the board. One-way: an out stone never re-enters
    /// simulation, and its velocity is always zero.
    pub out: bool,
}

impl Stone {
    /// Create a stone at rest.
    pub fn new(id: StoneId, team: Team, position: FixedVec2) -> Self {
        Self {
            id,
            team,
            position,
            velocity: FixedVec2::ZERO,
            radius: STONE_RADIUS,
            out: false,
        }
    }

    /// Still in play?
    #[inline]
    pub fn in_play(&self) -> bool {
        !self.out
    }

    /// Hash this stone's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.id.0);
        hasher.update_u8(self.team as u8);
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_fixed(self.radius);
        hasher.update_bool(self.out);
    }
}

/// Build the fixed starting configuration: five stones per team in a
/// staggered 3+2 grid, Cat rows descending from the top edge, Dog rows
/// mirrored up from the bottom edge.
pub fn starting_layout() -> Vec<Stone> {
    let mut stones = Vec::with_capacity(STONES_PER_TEAM * 2);
    let center_x = BOARD_WIDTH / 2;

    for i in 0..STONES_PER_TEAM {
        let col = (i % LAYOUT_COLS) as i32 - 1;
        let row = (i / LAYOUT_COLS) as i32;
        let x = center_x + col * LAYOUT_GAP;

        let cat_y = LAYOUT_OFFSET_Y + row * LAYOUT_GAP;
        stones.push(Stone::new(
            StoneId(i as u8),
            Team::Cat,
            FixedVec2::new(x, cat_y),
        ));
    }

    for i in 0..STONES_PER_TEAM {
        let col = (i % LAYOUT_COLS) as i32 - 1;
        let row = (i / LAYOUT_COLS) as i32;
        let x = center_x + col * LAYOUT_GAP;

        let dog_y = BOARD_HEIGHT - LAYOUT_OFFSET_Y - row * LAYOUT_GAP;
        stones.push(Stone::new(
            StoneId((STONES_PER_TEAM + i) as u8),
            Team::Dog,
            FixedVec2::new(x, dog_y),
        ));
    }

    stones
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;

    #[test]
    fn test_team_opponent() {
        assert_eq!(Team::Cat.opponent(), Team::Dog);
        assert_eq!(Team::Dog.opponent(), Team::Cat);
    }

    #[test]
    fn test_team_slots() {
        assert_eq!(Team::from_slot(0), Some(Team::Cat));
        assert_eq!(Team::from_slot(1), Some(Team::Dog));
        assert_eq!(Team::from_slot(2), None);
        assert_eq!(Team::Cat.slot(), 0);
        assert_eq!(Team::Dog.slot(), 1);
    }

    #[test]
    fn test_layout_counts_and_ids() {
        let stones = starting_layout();
        assert_eq!(stones.len(), 10);

        let cats = stones.iter().filter(|s| s.team == Team::Cat).count();
        let dogs = stones.iter().filter(|s| s.team == Team::Dog).count();
        assert_eq!(cats, STONES_PER_TEAM);
        assert_eq!(dogs, STONES_PER_TEAM);

        // Ids are 0..10 in creation order, all distinct
        for (i, stone) in stones.iter().enumerate() {
            assert_eq!(stone.id, StoneId(i as u8));
            assert!(stone.in_play());
            assert_eq!(stone.velocity, FixedVec2::ZERO);
            assert_eq!(stone.radius, to_fixed(18.0));
        }
    }

    #[test]
    fn test_layout_positions() {
        let stones = starting_layout();

        // First Cat row sits at y=120, centered around x=180
        assert_eq!(stones[0].position, FixedVec2::from_ints(128, 120));
        assert_eq!(stones[1].position, FixedVec2::from_ints(180, 120));
        assert_eq!(stones[2].position, FixedVec2::from_ints(232, 120));
        // Second Cat row staggers down one gap
        assert_eq!(stones[3].position, FixedVec2::from_ints(128, 172));
        assert_eq!(stones[4].position, FixedVec2::from_ints(180, 172));

        // Dog rows mirror vertically
        assert_eq!(stones[5].position, FixedVec2::from_ints(128, 520));
        assert_eq!(stones[8].position, FixedVec2::from_ints(128, 468));
    }

    #[test]
    fn test_layout_is_mirrored() {
        let stones = starting_layout();
        for i in 0..STONES_PER_TEAM {
            let cat = &stones[i];
            let dog = &stones[STONES_PER_TEAM + i];
            assert_eq!(cat.position.x, dog.position.x);
            assert_eq!(cat.position.y, BOARD_HEIGHT - dog.position.y);
        }
    }

    #[test]
    fn test_layout_no_initial_overlap() {
        let stones = starting_layout();
        for i in 0..stones.len() {
            for j in (i + 1)..stones.len() {
                let (ax, ay) = stones[i].position.to_floats();
                let (bx, by) = stones[j].position.to_floats();
                let dist = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
                // Layout gap (52) exceeds stone diameter (36)
                assert!(dist >= 36.0, "stones {i} and {j} overlap at start");
            }
        }
    }
}
