//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded from verifiable match parameters. The simulation
//! itself is randomness-free; the single consumer is the coin flip that
//! picks the opening turn, so replays stay byte-identical for a seed.

use sha2::{Digest, Sha256};

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// Given the same seed, produces the exact same sequence on any platform.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // State must never be all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Unbiased coin flip.
    #[inline]
    pub fn coin_flip(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a match seed from verifiable parameters.
///
/// The seed mixes server entropy (unknown to either client before the
/// match starts), the match id, and the sorted participant ids, so
/// neither player can steer the opening coin flip.
///
/// # Parameters
///
/// - `entropy`: server-side entropy fixed at match start
/// - `match_id`: unique match identifier
/// - `player_ids`: all participant IDs (MUST be sorted for determinism)
pub fn derive_match_seed(
    entropy: &[u8; 32],
    match_id: &[u8; 16],
    player_ids: &[[u8; 16]],
) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"ALKKAGI_SEED_V1");

    hasher.update(entropy);
    hasher.update(match_id);

    // IMPORTANT: caller must ensure player_ids is sorted!
    for pid in player_ids {
        hasher.update(pid);
    }

    let hash = hasher.finalize();

    // Take first 8 bytes as seed
    u64::from_le_bytes(hash[0..8].try_into().unwrap())
}

// =============================================================================
// TESTS
// =============================================================================
