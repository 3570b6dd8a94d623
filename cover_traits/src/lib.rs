pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Travel direction of an in-flight movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Opening,
    Closing,
}

impl Direction {
    /// The opposite travel direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Opening => Direction::Closing,
            Direction::Closing => Direction::Opening,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Opening => "opening",
            Direction::Closing => "closing",
        }
    }
}

/// Externally observed cover status, derived from position and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverStatus {
    Open,
    Closed,
    Opening,
    Closing,
    Stopped,
}

impl CoverStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CoverStatus::Open => "open",
            CoverStatus::Closed => "closed",
            CoverStatus::Opening => "opening",
            CoverStatus::Closing => "closing",
            CoverStatus::Stopped => "stopped",
        }
    }
}

/// Published snapshot of a cover's state. Readers never see the mutable
/// estimator state directly; they receive copies of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverState {
    /// Best position estimate, rounded to an integer percent (0 = closed).
    pub position: u8,
    /// In-flight direction; `None` while idle.
    pub direction: Option<Direction>,
    /// Direction of the most recent movement, kept across idle periods.
    pub last_direction: Direction,
    pub status: CoverStatus,
}

impl CoverState {
    /// Wire form of `direction`: "opening" | "closing" | "stopped".
    pub fn direction_str(&self) -> &'static str {
        self.direction.map_or("stopped", Direction::as_str)
    }
}

/// Physical on/off actuator behind the cover motor.
///
/// Exclusively driven by the motion engine for a given cover; externally
/// observed toggles come back in through the host boundary as feedback.
pub trait Switch {
    fn turn_on(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn turn_off(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<S: Switch + ?Sized> Switch for Box<S> {
    fn turn_on(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).turn_on()
    }

    fn turn_off(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).turn_off()
    }
}

/// Outbound state publication (entity/helper layer of the host).
///
/// Publish failures must never block or corrupt the estimator; callers log
/// and continue.
pub trait StateSink {
    fn publish(
        &mut self,
        state: &CoverState,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Command capability consumed by the host boundary.
///
/// Implementations serialize internally; methods take `&self` so the handle
/// can be shared with signal handlers and host callbacks.
pub trait CoverControl {
    fn open(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn close(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Move to the given position percentage. Out-of-range values clamp to
    /// [0, 100]; they are never rejected.
    fn set_position(&self, position: i64) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Halt any in-flight movement. Must turn the actuator off before
    /// returning; this is the safety-relevant path.
    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
