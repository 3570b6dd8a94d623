//! Runtime configuration for a single cover.
//!
//! This is the validated, in-memory form consumed by the engine builder. It
//! is separate from the TOML-deserialized schema in `cover_config`.

use std::time::Duration;

/// Travel parameters, fixed at build time (travel time may later be adjusted
/// through the engine's `set_travel_time`).
#[derive(Debug, Clone)]
pub struct TravelCfg {
    /// Seconds for a full 0→100 travel. Valid range: [1, 300].
    pub travel_time_s: f32,
    /// Seed position (percent) when no restored snapshot is supplied.
    pub initial_position: u8,
}

impl TravelCfg {
    pub fn travel_time(&self) -> Duration {
        Duration::from_secs_f64(f64::from(self.travel_time_s))
    }
}

impl Default for TravelCfg {
    fn default() -> Self {
        Self {
            travel_time_s: 60.0,
            initial_position: 0,
        }
    }
}
