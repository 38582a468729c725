//! State Hashing for Verification
//!
//! Deterministic hashing of match state for:
//! - Integrity verification between client and server
//! - Determinism checks in tests (two runs, one hash)
//! - Debugging divergence reports

use super::fixed::Fixed;
use super::vec2::FixedVec2;
use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for match state.
///
/// Wraps SHA-256 with helpers for fixed-point types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with a domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for match state.
    pub fn for_match_state() -> Self {
        Self::new(b"ALKKAGI_STATE_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a Fixed value.
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.update_i32(value);
    }

    /// Update with a FixedVec2.
    #[inline]
    pub fn update_vec2(&mut self, value: FixedVec2) {
        self.update_fixed(value.x);
        self.update_fixed(value.y);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute the state hash for match verification.
///
/// This function is called by `MatchState::compute_hash()`.
/// The parameter is a closure that adds state-specific data.
pub fn compute_state_hash<F>(tick: u32, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_match_state();

    // Always hash tick and seed first
    hasher.update_u32(tick);
    hasher.update_u64(rng_seed);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;

    #[test]
    fn test_hash_determinism() {
        let h1 = compute_state_hash(10, 42, |h| {
            h.update_vec2(FixedVec2::new(to_fixed(1.0), to_fixed(2.0)));
            h.update_bool(true);
        });
        let h2 = compute_state_hash(10, 42, |h| {
            h.update_vec2(FixedVec2::new(to_fixed(1.0), to_fixed(2.0)));
            h.update_bool(true);
        });
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_hash_sensitivity() {
        let base = compute_state_hash(10, 42, |h| h.update_fixed(to_fixed(1.0)));

        // Tick, seed, and payload all feed the hash
        assert_ne!(base, compute_state_hash(11, 42, |h| h.update_fixed(to_fixed(1.0))));
        assert_ne!(base, compute_state_hash(10, 43, |h| h.update_fixed(to_fixed(1.0))));
        assert_ne!(base, compute_state_hash(10, 42, |h| h.update_fixed(to_fixed(1.5))));
    }

    #[test]
    fn test_update_order_matters() {
        let mut h1 = StateHasher::for_match_state();
        h1.update_u8(1);
        h1.update_u8(2);

        let mut h2 = StateHasher::for_match_state();
        h2.update_u8(2);
        h2.update_u8(1);

        assert_ne!(h1.finalize(), h2.finalize());
    }
}
