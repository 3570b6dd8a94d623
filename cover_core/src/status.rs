//! Derivation of the externally published status from estimator state.

use cover_traits::{CoverStatus, Direction};

use crate::travel::FULL_SPAN;

/// Map position + direction to the published status.
///
/// `Open`/`Closed` require the cover to be idle at the respective bound;
/// anything else idle is `Stopped` (partially open).
pub fn derive_status(position: f64, direction: Option<Direction>) -> CoverStatus {
    match direction {
        Some(Direction::Opening) => CoverStatus::Opening,
        Some(Direction::Closing) => CoverStatus::Closing,
        None if position >= FULL_SPAN => CoverStatus::Open,
        None if position <= 0.0 => CoverStatus::Closed,
        None => CoverStatus::Stopped,
    }
}

/// Round the real-valued estimate to the published integer percent.
#[inline]
pub fn round_position(position: f64) -> u8 {
    position.round().clamp(0.0, FULL_SPAN) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_at_bounds_requires_idle() {
        assert_eq!(derive_status(100.0, None), CoverStatus::Open);
        assert_eq!(derive_status(0.0, None), CoverStatus::Closed);
        assert_eq!(derive_status(50.0, None), CoverStatus::Stopped);
        assert_eq!(
            derive_status(100.0, Some(Direction::Closing)),
            CoverStatus::Closing
        );
        assert_eq!(
            derive_status(0.0, Some(Direction::Opening)),
            CoverStatus::Opening
        );
    }

    #[test]
    fn rounding_matches_publish_contract() {
        assert_eq!(round_position(16.666), 17);
        assert_eq!(round_position(16.4), 16);
        assert_eq!(round_position(0.0), 0);
        assert_eq!(round_position(100.0), 100);
    }
}
