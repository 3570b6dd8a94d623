//! Human-readable error descriptions and structured JSON error formatting.

use cover_core::{BuildError, CoverError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSwitch => {
                "What happened: No switch was provided to the cover engine.\nLikely causes: The switch backend failed to initialize or was not wired into the builder.\nHow to fix: Check the switch_entity value in the config and rerun.".to_string()
            }
            BuildError::MissingTravel => {
                "What happened: Travel config not set.\nLikely causes: The builder was not given a travel time.\nHow to fix: Provide travel_time_s in the config.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CoverError>() {
        return match ce {
            CoverError::ActuatorUnavailable(msg) => format!(
                "What happened: The switch is unavailable ({msg}).\nLikely causes: The entity is offline or the GPIO pin could not be opened.\nHow to fix: Verify the switch backend is reachable, then rerun."
            ),
            CoverError::Actuator(msg) => format!(
                "What happened: The switch rejected a command ({msg}).\nLikely causes: Transient backend failure.\nHow to fix: Rerun; if it persists, check the switch wiring/backend."
            ),
            CoverError::Scheduler(msg) => format!(
                "What happened: The stop timer failed ({msg}).\nLikely causes: The timer thread died.\nThe motor was turned off as a precaution.\nHow to fix: Restart the controller."
            ),
            other => format!(
                "What happened: {other}.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("failed to read config") {
        return format!(
            "What happened: {msg}.\nLikely causes: Wrong --config path or missing file.\nHow to fix: Point --config at a readable TOML file."
        );
    }
    if lower.contains("[[covers]]") || lower.contains("travel_time_s") || lower.contains("no cover named") {
        return format!(
            "What happened: Configuration is invalid or incomplete ({msg}).\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map typed failures to stable exit codes; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ce) = err.downcast_ref::<CoverError>() {
        return match ce {
            CoverError::ActuatorUnavailable(_) => 3,
            CoverError::Actuator(_) => 4,
            CoverError::Scheduler(_) => 5,
            _ => 1,
        };
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    match err.downcast_ref::<CoverError>() {
        Some(CoverError::ActuatorUnavailable(_)) => "ActuatorUnavailable",
        Some(CoverError::Actuator(_)) => "Actuator",
        Some(CoverError::Scheduler(_)) => "Scheduler",
        Some(_) => "Cover",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
