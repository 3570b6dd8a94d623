//! Cover assembly and command execution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cover_config::CoverCfg;
use cover_core::{Cover, CoverState, StateSink, Switch};
use eyre::Result;

use crate::cli::Commands;

/// How often the wait loop samples the interpolated state.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Sink that prints every published snapshot to stdout, one line each.
pub struct StdoutSink {
    cover: String,
    json: bool,
}

impl StdoutSink {
    pub fn new(cover: &str, json: bool) -> Self {
        Self {
            cover: cover.to_string(),
            json,
        }
    }
}

impl StateSink for StdoutSink {
    fn publish(
        &mut self,
        state: &CoverState,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        print_state(&self.cover, state, self.json);
        Ok(())
    }
}

pub fn print_state(cover: &str, state: &CoverState, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "cover": cover,
                "position": state.position,
                "direction": state.direction_str(),
                "status": state.status.as_str(),
            })
        );
    } else {
        println!("{cover}: position {} ({})", state.position, state.status.as_str());
    }
}

/// Build the switch backend for a configured cover.
///
/// Sim builds always use the in-memory switch. With the `hardware` feature
/// the switch_entity selects a GPIO relay via `gpio:<bcm_pin>` (append
/// `:active_low` for inverted relays).
pub fn make_switch(cfg: &CoverCfg) -> Result<Box<dyn Switch + Send>> {
    #[cfg(feature = "hardware")]
    {
        if let Some(spec) = cfg.switch_entity.strip_prefix("gpio:") {
            let (pin_str, active_low) = match spec.strip_suffix(":active_low") {
                Some(rest) => (rest, true),
                None => (spec, false),
            };
            let pin: u8 = pin_str
                .parse()
                .map_err(|_| eyre::eyre!("switch_entity {} has no valid BCM pin", cfg.switch_entity))?;
            let relay = cover_hardware::RelaySwitch::new(pin, active_low)?;
            return Ok(Box::new(relay));
        }
        eyre::bail!(
            "switch_entity {} is not a gpio:<pin> spec; hardware builds drive GPIO relays only",
            cfg.switch_entity
        );
    }
    #[cfg(not(feature = "hardware"))]
    {
        tracing::info!(entity = %cfg.switch_entity, "sim mode; using in-memory switch");
        Ok(Box::new(cover_hardware::SimulatedSwitch::new()))
    }
}

/// Execute one command against the cover and, for movement commands, wait
/// until the scheduled stop lands (or Ctrl-C stops the motor early).
pub fn execute(
    cover: &Cover,
    name: &str,
    cmd: &Commands,
    shutdown: &Arc<AtomicBool>,
    json: bool,
) -> Result<()> {
    match cmd {
        Commands::Status => {
            print_state(name, &cover.state()?, json);
            return Ok(());
        }
        Commands::Stop => {
            cover.halt()?;
            print_state(name, &cover.state()?, json);
            return Ok(());
        }
        Commands::Open => cover.move_to_percent(100)?,
        Commands::Close => cover.move_to_percent(0)?,
        Commands::SetPosition { position } => cover.move_to_percent(*position)?,
    }

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::warn!("interrupted; stopping motor");
            cover.halt()?;
            return Ok(());
        }
        let state = cover.state()?;
        if state.direction.is_none() {
            return Ok(());
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
