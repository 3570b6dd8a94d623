//! Pure travel-time arithmetic: elapsed time → position, target → duration.
//!
//! No mutable state lives here; the engine owns the state and calls into
//! these helpers for every estimate.

use std::time::Duration;

use cover_traits::Direction;

/// Full travel span in percent.
pub const FULL_SPAN: f64 = 100.0;

/// Clamp a position to the valid [0, 100] range. Out-of-range inputs are
/// silently clamped, never rejected.
#[inline]
pub fn clamp_position(p: f64) -> f64 {
    p.clamp(0.0, FULL_SPAN)
}

/// Linear interpolation of position after `elapsed` of travel.
///
/// `delta = elapsed / travel_time * 100`, signed by direction, clamped to
/// [0, 100]. Callers cap `elapsed` at the planned duration so the estimate
/// never overshoots the target.
pub fn position_after(
    start: f64,
    direction: Direction,
    elapsed: Duration,
    travel_time: Duration,
) -> f64 {
    let frac = elapsed.as_secs_f64() / travel_time.as_secs_f64();
    let delta = frac * FULL_SPAN;
    let moved = match direction {
        Direction::Opening => start + delta,
        Direction::Closing => start - delta,
    };
    clamp_position(moved)
}

/// Plan the movement from `start` to `target` (both percent).
///
/// `duration = |target - start| / 100 * travel_time`. Returns `None` when the
/// clamped target equals the start exactly; the caller must treat that as a
/// no-op, not a movement.
pub fn plan_move(
    start: f64,
    target: f64,
    travel_time: Duration,
) -> Option<(Direction, Duration)> {
    let target = clamp_position(target);
    let distance = target - start;
    if distance == 0.0 {
        return None;
    }
    let direction = if distance > 0.0 {
        Direction::Opening
    } else {
        Direction::Closing
    };
    let duration = travel_time.mul_f64(distance.abs() / FULL_SPAN);
    Some((direction, duration))
}
