//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the match simulation.
//! All gameplay arithmetic is integer-only - no floats in game logic.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 units                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The board is 360x640 units, stone speeds stay in the low tens of
//! units per tick, so Q16.16 leaves ample headroom as long as squared
//! quantities are bounded first (see `game::physics`).

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

// =============================================================================
// GAME CONSTANTS (All as integer literals - NO float conversion!)
// =============================================================================

/// Board width: 360.0 = 360 * 65536
pub const BOARD_WIDTH: Fixed = 23592960;

/// Board height: 640.0 = 640 * 65536
pub const BOARD_HEIGHT: Fixed = 41943040;

/// Stone radius: 18.0 = 18 * 65536
pub const STONE_RADIUS: Fixed = 1179648;

/// Per-tick velocity decay factor: 0.992 = round(0.992 * 65536)
pub const FRICTION: Fixed = 65012;

/// Velocity component below this snaps to exactly zero: 0.01 * 65536
pub const STOP_EPSILON: Fixed = 655;

/// A stone counts as moving above this component magnitude: 0.02 * 65536
pub const REST_EPSILON: Fixed = 1311;

/// Fixed timestep: 1.0 (velocities are expressed in units per tick)
pub const TICK_DT: Fixed = FIXED_ONE;

/// Per-component clamp applied to accepted shot impulses: 12.0 * 65536
pub const MAX_SHOT_SPEED: Fixed = 786432;

/// Hard ceiling on physics steps per simulation run.
///
/// Snap-to-zero makes every settle finite; the ceiling only guards
/// against numerical pathologies. On overrun all velocities are zeroed
/// and rest is declared.
pub const MAX_SETTLE_TICKS: u32 = 8000;

/// Stones per layout row
pub const LAYOUT_COLS: usize = 3;

/// Spacing between layout slots: 52.0 = 52 * 65536
pub const LAYOUT_GAP: Fixed = 3407872;

/// Distance of a team's first row from its board edge: 120.0 * 65536
pub const LAYOUT_OFFSET_Y: Fixed = 7864320;

// =============================================================================
// CORE OPERATIONS (All deterministic, wrapping semantics)
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// # Warning
/// Only use at compile-time or in tests. NEVER in the tick loop.
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert fixed-point to float for display/logging.
///
/// # Warning
/// Only use for output. NEVER feed the result back into game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Multiply two fixed-point numbers.
///
/// Uses an i64 intermediate to prevent overflow, then truncates.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Divide two fixed-point numbers.
///
/// Pre-shifts the numerator to keep precision.
/// Returns 0 on divide-by-zero rather than panicking.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = (a as i64) << FIXED_SCALE;
    (wide / b as i64) as Fixed
}

/// Square root using Newton-Raphson iteration.
///
/// Returns 0 for non-positive inputs. Runs exactly 6 iterations so the
/// result is identical on every platform; within collision range
/// (inputs under ~40 units squared) the error stays below 0.1 units.
/// Prefer squared distances where an exact root is not needed.
#[inline]
pub fn fixed_sqrt(x: Fixed) -> Fixed {
    if x <= 0 {
        return 0;
    }

    let mut guess = (x >> 1).max(1);

    // Newton-Raphson: guess = (guess + x/guess) / 2
    for _ in 0..6 {
        let div = fixed_div(x, guess);
        guess = (guess.wrapping_add(div)) >> 1;

        if guess == 0 {
            guess = 1;
        }
    }

    guess
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 {
        x.wrapping_neg()
    } else {
        x
    }
}

/// Minimum of two fixed-point numbers.
#[inline]
pub fn fixed_min(a: Fixed, b: Fixed) -> Fixed {
    if a < b {
        a
    } else {
        b
    }
}

/// Maximum of two fixed-point numbers.
#[inline]
pub fn fixed_max(a: Fixed, b: Fixed) -> Fixed {
    if a > b {
        a
    } else {
        b
    }
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    fixed_max(min, fixed_min(max, value))
}

// =============================================================================
// TESTS
// =============================================================================
