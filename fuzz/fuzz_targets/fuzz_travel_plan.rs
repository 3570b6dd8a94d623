#![no_main]
use libfuzzer_sys::fuzz_target;
use std::time::Duration;

// Arbitrary floats into the travel arithmetic must never panic and planned
// durations must stay within the full travel time.
fuzz_target!(|input: (f64, f64, u16)| {
    let (start, target, travel_ds) = input;
    if !start.is_finite() || !target.is_finite() {
        return;
    }
    let start = cover_core::travel::clamp_position(start);
    let travel = Duration::from_millis(100 + u64::from(travel_ds) * 100);

    if let Some((direction, duration)) = cover_core::travel::plan_move(start, target, travel) {
        assert!(duration <= travel + Duration::from_nanos(1));
        let landed = cover_core::travel::position_after(start, direction, duration, travel);
        assert!((0.0..=100.0).contains(&landed));
    }
});
