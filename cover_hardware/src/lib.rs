//! Switch backends for the cover controller.
//!
//! `SimulatedSwitch` is an in-memory stand-in used by the CLI's sim mode and
//! by tests. The `hardware` feature adds `RelaySwitch`, which drives a relay
//! through a Raspberry Pi GPIO pin via `rppal`.

pub mod error;

#[cfg(feature = "hardware")]
pub mod gpio;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cover_traits::Switch;

pub use error::HwError;
#[cfg(feature = "hardware")]
pub use gpio::RelaySwitch;

/// Simulated on/off switch. The shared flag lets tests and the sim runner
/// observe the commanded state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSwitch {
    on: Arc<AtomicBool>,
}

impl SimulatedSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for observing the switch state from outside the engine.
    pub fn state_handle(&self) -> Arc<AtomicBool> {
        self.on.clone()
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Relaxed)
    }
}

impl Switch for SimulatedSwitch {
    fn turn_on(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.on.store(true, Ordering::Relaxed);
        tracing::debug!("simulated switch on");
        Ok(())
    }

    fn turn_off(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.on.store(false, Ordering::Relaxed);
        tracing::debug!("simulated switch off");
        Ok(())
    }
}

/// A switch that fails every call; used to exercise the rejected-command
/// paths without hardware.
#[derive(Debug, Default)]
pub struct UnavailableSwitch;

impl Switch for UnavailableSwitch {
    fn turn_on(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(HwError::Unavailable("switch entity missing".into())))
    }

    fn turn_off(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(HwError::Unavailable("switch entity missing".into())))
    }
}
