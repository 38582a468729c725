//! Physics Step and Rest Detection
//!
//! One fixed-timestep advance of the whole board: integration with
//! friction, snap-to-zero, rectangular out-of-bounds elimination, and
//! pairwise normal-impulse collision resolution.
//!
//! The step is a pure function of the stone slice - no I/O, no clock,
//! no randomness - so repeated application from the same state always
//! produces the same trajectory.

use crate::core::fixed::{
    fixed_abs, fixed_mul, fixed_sqrt, BOARD_HEIGHT, BOARD_WIDTH, FRICTION, REST_EPSILON,
    STOP_EPSILON, TICK_DT,
};
use crate::core::vec2::FixedVec2;
use crate::game::stone::{Stone, StoneId};

/// What one physics step did to the board.
#[derive(Debug, Default)]
pub struct StepOutcome {
    /// Stones knocked off the board this step, in id order.
    pub newly_out: Vec<StoneId>,
}

/// Advance all in-play stones by exactly one fixed timestep.
///
/// Stage order matters and is part of the contract:
/// 1. integrate + friction + snap-to-zero
/// 2. out-of-bounds elimination (board rectangle expanded by the
///    stone's own radius)
/// 3. pairwise collision resolution in index order
pub fn step(stones: &mut [Stone]) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    for stone in stones.iter_mut() {
        if stone.out {
            continue;
        }

        // Integration: position += velocity * dt, then friction
        stone.position = stone.position.add(stone.velocity.scale(TICK_DT));
        stone.velocity = stone.velocity.scale(FRICTION);

        // Snap tiny components to exactly zero so rest is reached in
        // finitely many ticks instead of asymptotically
        if fixed_abs(stone.velocity.x) < STOP_EPSILON {
            stone.velocity.x = 0;
        }
        if fixed_abs(stone.velocity.y) < STOP_EPSILON {
            stone.velocity.y = 0;
        }

        // Boundary elimination: the rectangle is expanded outward by the
        // stone's radius, so a stone is out only once fully clear
        if stone.position.x < -stone.radius
            || stone.position.x > BOARD_WIDTH + stone.radius
            || stone.position.y < -stone.radius
            || stone.position.y > BOARD_HEIGHT + stone.radius
        {
            stone.out = true;
            stone.velocity = FixedVec2::ZERO;
            outcome.newly_out.push(stone.id);
        }
    }

    resolve_collisions(stones);

    outcome
}

/// Resolve every overlapping pair of in-play stones.
///
/// Positional correction splits the overlap 50/50 along the collision
/// normal. The velocity response fires only for closing pairs: the full
/// relative normal speed is applied as an equal-and-opposite impulse
/// (restitution 1, tangential velocity untouched). Pairs already
/// separating are repositioned but keep their velocities, so no energy
/// is injected.
fn resolve_collisions(stones: &mut [Stone]) {
    for i in 0..stones.len() {
        for j in (i + 1)..stones.len() {
            let (head, tail) = stones.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];

            if a.out || b.out {
                continue;
            }

            let dx = b.position.x.wrapping_sub(a.position.x);
            let dy = b.position.y.wrapping_sub(a.position.y);
            let min_dist = a.radius + b.radius;

            // Axis screening before squaring: board-scale separations
            // would overflow the Q16.16 square
            if fixed_abs(dx) >= min_dist || fixed_abs(dy) >= min_dist {
                continue;
            }

            let delta = FixedVec2::new(dx, dy);
            let dist_sq = delta.length_squared();
            // Exactly coincident centers have no usable normal
            if dist_sq == 0 || dist_sq >= fixed_mul(min_dist, min_dist) {
                continue;
            }

            let dist = fixed_sqrt(dist_sq);
            if dist == 0 {
                continue;
            }

            let normal = delta.div_scalar(dist);

            // Separate the pair so they end exactly touching
            let half_overlap = (min_dist - dist) / 2;
            let correction = normal.scale(half_overlap);
            a.position = a.position.sub(correction);
            b.position = b.position.add(correction);

            // Impulse only against closing motion
            let closing = b.velocity.sub(a.velocity).dot(normal);
            if closing < 0 {
                let impulse = normal.scale(-closing);
                a.velocity = a.velocity.sub(impulse);
                b.velocity = b.velocity.add(impulse);
            }
        }
    }
}

/// True if any in-play stone still has a velocity component above the
/// rest threshold.
pub fn any_moving(stones: &[Stone]) -> bool {
    stones.iter().any(|s| {
        !s.out
            && (fixed_abs(s.velocity.x) > REST_EPSILON || fixed_abs(s.velocity.y) > REST_EPSILON)
    })
}

/// True once the whole board has converged to stillness.
#[inline]
pub fn at_rest(stones: &[Stone]) -> bool {
    !any_moving(stones)
}

// =============================================================================
// TESTS
// =============================================================================
