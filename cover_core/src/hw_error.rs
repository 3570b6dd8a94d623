//! Maps `Box<dyn Error>` from trait boundaries to typed `CoverError`.
//!
//! The traits in `cover_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `cover_hardware::HwError`
//! downcasting.

use crate::error::CoverError;

/// Map a trait-boundary error to a typed `CoverError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> CoverError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<cover_hardware::HwError>() {
            return match hw {
                cover_hardware::HwError::Unavailable(s) => {
                    CoverError::ActuatorUnavailable(s.clone())
                }
                other => CoverError::Actuator(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("unavailable") {
        CoverError::ActuatorUnavailable(s)
    } else {
        CoverError::Actuator(s)
    }
}
