//! Relay switch driven through a Raspberry Pi GPIO pin.

use cover_traits::Switch;
use rppal::gpio::{Gpio, OutputPin};

use crate::error::HwError;

/// Active-high relay on a single GPIO output.
pub struct RelaySwitch {
    pin: OutputPin,
    active_low: bool,
}

impl RelaySwitch {
    pub fn new(bcm_pin: u8, active_low: bool) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut pin = gpio
            .get(bcm_pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output();
        // Start de-energized.
        if active_low {
            pin.set_high();
        } else {
            pin.set_low();
        }
        Ok(Self { pin, active_low })
    }
}

impl Switch for RelaySwitch {
    fn turn_on(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.active_low {
            self.pin.set_low();
        } else {
            self.pin.set_high();
        }
        tracing::debug!(pin = self.pin.pin(), "relay on");
        Ok(())
    }

    fn turn_off(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.active_low {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        tracing::debug!(pin = self.pin.pin(), "relay off");
        Ok(())
    }
}

impl Drop for RelaySwitch {
    fn drop(&mut self) {
        // De-energize on teardown; never leave the motor powered.
        if self.active_low {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}
