#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the cover controller.
//!
//! `Config` and sub-structs are deserialized from TOML and validated. One
//! file describes any number of covers; each cover names the switch entity
//! that drives its motor and the full-travel time used by the estimator.
use serde::Deserialize;

/// Travel time bounds in seconds, inclusive.
pub const TRAVEL_TIME_RANGE_S: (f32, f32) = (1.0, 300.0);

/// A single cover definition.
///
/// Example:
/// ```toml
/// [[covers]]
/// name = "living room blind"
/// switch_entity = "switch.blind_living_room"
/// travel_time_s = 30.0
/// initial_position = 0
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct CoverCfg {
    /// Display name; must be unique within the file.
    pub name: String,
    /// Reference to the on/off switch that drives the motor.
    pub switch_entity: String,
    /// Seconds for a full 0→100 travel. Accepts alias "travel_time".
    #[serde(alias = "travel_time")]
    pub travel_time_s: f32,
    /// Seed position when no restored state exists (percent, 0 = closed).
    #[serde(default)]
    pub initial_position: u8,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub covers: Vec<CoverCfg>,
    pub logging: Logging,
}

impl Config {
    /// Validate the parsed configuration.
    ///
    /// Error messages are stable strings asserted by tests and surfaced
    /// verbatim through the CLI's setup-failure path.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.covers.is_empty() {
            eyre::bail!("config must define at least one [[covers]] entry");
        }
        let mut seen = std::collections::HashSet::new();
        for cover in &self.covers {
            if cover.name.trim().is_empty() {
                eyre::bail!("cover name must not be empty");
            }
            if !seen.insert(cover.name.as_str()) {
                eyre::bail!("duplicate cover name: {}", cover.name);
            }
            if cover.switch_entity.trim().is_empty() {
                eyre::bail!("switch_entity must not be empty for cover {}", cover.name);
            }
            if !cover.travel_time_s.is_finite()
                || cover.travel_time_s < TRAVEL_TIME_RANGE_S.0
                || cover.travel_time_s > TRAVEL_TIME_RANGE_S.1
            {
                eyre::bail!(
                    "travel_time_s must be within [1, 300] for cover {}",
                    cover.name
                );
            }
            if cover.initial_position > 100 {
                eyre::bail!(
                    "initial_position must be within [0, 100] for cover {}",
                    cover.name
                );
            }
        }
        if let Some(level) = self.logging.level.as_deref()
            && !matches!(level, "error" | "warn" | "info" | "debug" | "trace")
        {
            eyre::bail!("logging.level must be one of error|warn|info|debug|trace");
        }
        Ok(())
    }

    /// Find a cover by name, or the only cover when `name` is `None`.
    pub fn select_cover(&self, name: Option<&str>) -> eyre::Result<&CoverCfg> {
        match name {
            Some(n) => self
                .covers
                .iter()
                .find(|c| c.name == n)
                .ok_or_else(|| eyre::eyre!("no cover named {n} in config")),
            None if self.covers.len() == 1 => Ok(&self.covers[0]),
            None => eyre::bail!("config defines multiple covers; pass --cover NAME"),
        }
    }
}

/// Parse TOML text into a `Config` (not yet validated).
pub fn load_toml(text: &str) -> eyre::Result<Config> {
    let cfg: Config = toml::from_str(text)?;
    Ok(cfg)
}

/// Read and parse a config file (not yet validated).
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config {}: {e}", path.display()))?;
    load_toml(&text)
}
