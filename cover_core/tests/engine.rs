use std::time::Duration;

use cover_core::mocks::{
    FailingScheduler, FailingSink, FailingSwitch, MemorySink, MockSwitch, RecordingScheduler,
    SchedulerEvent, SwitchCall,
};
use cover_core::{Cover, CoverEngine, CoverStatus, Direction, Switch, TravelCfg};
use cover_traits::{CoverState, ManualClock};
use rstest::rstest;

struct Harness {
    clock: ManualClock,
    switch: MockSwitch,
    sched: RecordingScheduler,
    sink: MemorySink,
    engine: CoverEngine<Box<dyn Switch + Send>>,
}

fn harness(travel_time_s: f32, initial_position: u8) -> Harness {
    let clock = ManualClock::new();
    let switch = MockSwitch::new();
    let sched = RecordingScheduler::new();
    let sink = MemorySink::new();
    let engine = Cover::builder()
        .with_switch(switch.clone())
        .with_travel(TravelCfg {
            travel_time_s,
            initial_position,
        })
        .with_clock(clock.clone())
        .with_scheduler(sched.clone())
        .with_sink(sink.clone())
        .build()
        .expect("build engine");
    Harness {
        clock,
        switch,
        sched,
        sink,
        engine,
    }
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[rstest]
#[case(100)]
#[case(50)]
#[case(1)]
#[case(0)]
fn set_position_lands_exactly_on_target(#[case] target: i64) {
    let mut h = harness(30.0, 0);
    h.engine.move_to(target as f64).expect("move");

    if target == 0 {
        // Already there: no movement, no armed stop.
        assert!(h.sched.last_armed().is_none());
        assert!(!h.engine.is_moving());
        return;
    }

    let (after, movement) = h.sched.last_armed().expect("stop armed");
    let expected = Duration::from_secs_f64(target as f64 / 100.0 * 30.0);
    assert!(
        (after.as_secs_f64() - expected.as_secs_f64()).abs() < 1e-6,
        "armed {after:?}, expected {expected:?}"
    );
    assert_eq!(h.engine.direction(), Some(Direction::Opening));

    h.clock.advance(after);
    h.engine.on_scheduled_stop(movement);

    assert!(!h.engine.is_moving());
    assert_eq!(h.engine.estimated_position(), target as f64);
    let last = h.sink.last().expect("published");
    assert_eq!(last.position, target as u8);
    assert_eq!(last.direction, None);
}

#[test]
fn stop_mid_travel_freezes_elapsed_estimate() {
    // travel 30 s from 0: setPosition(50) arms a stop at t=15 s; stop at
    // t=5 s must land on 16.67 -> published 17 and cancel the armed stop.
    let mut h = harness(30.0, 0);
    h.engine.move_to(50.0).expect("move");
    let (_, movement) = h.sched.last_armed().expect("armed");

    h.clock.advance(secs(5));
    h.engine.stop().expect("stop");

    assert!((h.engine.estimated_position() - 16.666_666).abs() < 1e-3);
    let last = h.sink.last().expect("published");
    assert_eq!(last.position, 17);
    assert_eq!(last.status, CoverStatus::Stopped);
    assert_eq!(h.sched.cancel_count(), 1);
    assert_eq!(h.switch.calls(), vec![SwitchCall::On, SwitchCall::Off]);

    // The superseded fire must not apply even if the cancel were to fail.
    h.clock.advance(secs(10));
    h.engine.on_scheduled_stop(movement);
    assert!((h.engine.estimated_position() - 16.666_666).abs() < 1e-3);

    // stop() is idempotent.
    h.engine.stop().expect("stop again");
    assert_eq!(h.switch.calls().len(), 2);
}

#[test]
fn reversal_mid_travel_replans_remaining_distance() {
    // setPosition(100) at t=0, setPosition(0) at t=10 (travel 30): finalize
    // at ~33, then closing for ~10 s.
    let mut h = harness(30.0, 0);
    h.engine.move_to(100.0).expect("open");
    h.clock.advance(secs(10));
    h.engine.move_to(0.0).expect("close");

    assert_eq!(h.engine.direction(), Some(Direction::Closing));
    let (after, movement) = h.sched.last_armed().expect("armed");
    assert!(
        (after.as_secs_f64() - 10.0).abs() < 1e-6,
        "armed {after:?}, expected ~10s"
    );
    // Reversal cycles the actuator: on, off, on.
    assert_eq!(
        h.switch.calls(),
        vec![SwitchCall::On, SwitchCall::Off, SwitchCall::On]
    );

    h.clock.advance(after);
    h.engine.on_scheduled_stop(movement);
    assert_eq!(h.engine.estimated_position(), 0.0);
    assert_eq!(h.sink.last().expect("published").status, CoverStatus::Closed);
}

#[test]
fn same_direction_retarget_keeps_actuator_running() {
    let mut h = harness(30.0, 0);
    h.engine.move_to(40.0).expect("move");
    h.clock.advance(secs(6)); // at 20
    h.engine.move_to(80.0).expect("retarget");

    // No off/on cycle for the continuation.
    assert_eq!(h.switch.calls(), vec![SwitchCall::On]);
    let (after, _) = h.sched.last_armed().expect("armed");
    // 60% remaining of 30 s.
    assert!((after.as_secs_f64() - 18.0).abs() < 1e-6, "armed {after:?}");
}

#[test]
fn repeated_target_is_single_actuator_cycle() {
    let mut h = harness(30.0, 0);
    h.engine.move_to(50.0).expect("move");
    let (after, movement) = h.sched.last_armed().expect("armed");
    h.clock.advance(after);
    h.engine.on_scheduled_stop(movement);

    // Second identical command is a no-op: no extra switch traffic.
    h.engine.move_to(50.0).expect("noop");
    assert_eq!(h.switch.on_count(), 1);
    assert_eq!(h.switch.off_count(), 1);
    assert!(!h.engine.is_moving());
}

#[test]
fn out_of_range_targets_clamp() {
    let mut a = harness(30.0, 0);
    let mut b = harness(30.0, 0);
    a.engine.move_to(150.0).expect("move");
    b.engine.move_to(100.0).expect("move");
    assert_eq!(a.sched.last_armed().map(|(d, _)| d), b.sched.last_armed().map(|(d, _)| d));

    let mut c = harness(30.0, 50);
    c.engine.move_to(-10.0).expect("move");
    let (after, _) = c.sched.last_armed().expect("armed");
    assert!((after.as_secs_f64() - 15.0).abs() < 1e-6);
    assert_eq!(c.engine.direction(), Some(Direction::Closing));
}

#[test]
fn round_trip_ends_open() {
    let mut h = harness(30.0, 0);
    for target in [100.0, 0.0, 100.0] {
        h.engine.move_to(target).expect("move");
        let (after, movement) = h.sched.last_armed().expect("armed");
        h.clock.advance(after);
        h.engine.on_scheduled_stop(movement);
    }
    assert_eq!(h.engine.estimated_position(), 100.0);
    assert_eq!(h.sink.last().expect("published").status, CoverStatus::Open);
}

#[test]
fn observed_on_while_idle_tracks_heuristic_direction() {
    // Closed cover: external on means opening.
    let mut h = harness(30.0, 0);
    h.engine.handle_switch_observed(true);
    assert_eq!(h.engine.direction(), Some(Direction::Opening));
    assert!(h.sched.last_armed().is_none(), "no stop is scheduled");

    h.clock.advance(secs(9));
    h.engine.handle_switch_observed(false);
    assert!(!h.engine.is_moving());
    assert!((h.engine.estimated_position() - 30.0).abs() < 1e-6);

    // Fully open cover: external on means closing.
    let mut h = harness(30.0, 100);
    h.engine.handle_switch_observed(true);
    assert_eq!(h.engine.direction(), Some(Direction::Closing));

    // Mid-range: opposite of the last movement's direction.
    let mut h = harness(30.0, 50);
    h.engine.move_to(20.0).expect("move"); // closing
    let (after, movement) = h.sched.last_armed().expect("armed");
    h.clock.advance(after);
    h.engine.on_scheduled_stop(movement);
    h.engine.handle_switch_observed(true);
    assert_eq!(h.engine.direction(), Some(Direction::Opening));
}

#[test]
fn observed_off_mid_command_finalizes_like_stop() {
    let mut h = harness(30.0, 0);
    h.engine.move_to(100.0).expect("open");
    h.clock.advance(secs(15));
    h.engine.handle_switch_observed(false);

    assert!(!h.engine.is_moving());
    assert!((h.engine.estimated_position() - 50.0).abs() < 1e-6);
    assert_eq!(h.sched.cancel_count(), 1);
    // The switch was toggled off externally; the engine must not re-send off.
    assert_eq!(h.switch.calls(), vec![SwitchCall::On]);
}

#[test]
fn scheduler_fault_forces_motor_off() {
    let clock = ManualClock::new();
    let switch = MockSwitch::new();
    let mut engine = Cover::builder()
        .with_switch(switch.clone())
        .with_travel(TravelCfg {
            travel_time_s: 30.0,
            initial_position: 0,
        })
        .with_clock(clock)
        .with_scheduler(FailingScheduler)
        .build()
        .expect("build");

    let err = engine.move_to(50.0).expect_err("scheduler fault");
    assert!(format!("{err}").contains("timer backend down"), "{err}");
    assert!(!engine.is_moving());
    // Fail safe: the motor was energized and then immediately cut.
    assert_eq!(switch.calls(), vec![SwitchCall::On, SwitchCall::Off]);
    assert_eq!(engine.estimated_position(), 0.0);
}

#[test]
fn actuator_fault_rejects_command_without_state_change() {
    let sched = RecordingScheduler::new();
    let mut engine = Cover::builder()
        .with_switch(FailingSwitch)
        .with_travel(TravelCfg {
            travel_time_s: 30.0,
            initial_position: 20,
        })
        .with_scheduler(sched.clone())
        .build()
        .expect("build");

    let err = engine.move_to(80.0).expect_err("switch fault");
    assert!(format!("{err:#}").contains("unavailable"), "{err:#}");
    assert!(!engine.is_moving());
    assert_eq!(engine.estimated_position(), 20.0);
    assert!(sched.last_armed().is_none());
}

#[test]
fn publish_failure_never_blocks_commands() {
    let clock = ManualClock::new();
    let mut engine = Cover::builder()
        .with_switch(MockSwitch::new())
        .with_travel(TravelCfg {
            travel_time_s: 30.0,
            initial_position: 0,
        })
        .with_clock(clock)
        .with_scheduler(RecordingScheduler::new())
        .with_sink(FailingSink)
        .build()
        .expect("build");

    engine.move_to(50.0).expect("move despite sink failure");
    engine.stop().expect("stop despite sink failure");
}

#[test]
fn travel_time_change_mid_flight_replans() {
    let mut h = harness(30.0, 0);
    h.engine.move_to(100.0).expect("open");
    h.clock.advance(secs(15)); // at 50

    h.engine.set_travel_time(60.0).expect("retime");
    assert_eq!(h.engine.travel_time(), secs(60));
    assert_eq!(h.engine.direction(), Some(Direction::Opening));
    let (after, movement) = h.sched.last_armed().expect("re-armed");
    // 50% remaining at the new rate.
    assert!((after.as_secs_f64() - 30.0).abs() < 1e-6, "armed {after:?}");

    h.clock.advance(after);
    h.engine.on_scheduled_stop(movement);
    assert_eq!(h.engine.estimated_position(), 100.0);
}

#[test]
fn travel_time_clamps_to_valid_range() {
    let mut h = harness(30.0, 0);
    h.engine.set_travel_time(1000.0).expect("retime");
    assert_eq!(h.engine.travel_time(), secs(300));
    h.engine.set_travel_time(0.1).expect("retime");
    assert_eq!(h.engine.travel_time(), secs(1));
    assert!(h.engine.set_travel_time(f32::NAN).is_err());
}

#[test]
fn override_position_drops_tracking() {
    let mut h = harness(30.0, 0);
    h.engine.move_to(100.0).expect("open");
    h.clock.advance(secs(5));
    h.engine.override_position(40.0).expect("override");

    assert!(!h.engine.is_moving());
    assert_eq!(h.engine.estimated_position(), 40.0);
    assert_eq!(h.sched.cancel_count(), 1);
    assert_eq!(h.switch.calls(), vec![SwitchCall::On, SwitchCall::Off]);
    let last = h.sink.last().expect("published");
    assert_eq!(last.position, 40);
    assert_eq!(last.status, CoverStatus::Stopped);
}

#[test]
fn restored_snapshot_seeds_position_and_direction() {
    let sched = RecordingScheduler::new();
    let mut engine = Cover::builder()
        .with_switch(MockSwitch::new())
        .with_travel(TravelCfg {
            travel_time_s: 30.0,
            initial_position: 0,
        })
        .with_scheduler(sched)
        .restore_state(CoverState {
            position: 70,
            direction: None,
            last_direction: Direction::Opening,
            status: CoverStatus::Stopped,
        })
        .build()
        .expect("build");

    assert_eq!(engine.estimated_position(), 70.0);
    // Heuristic uses the restored last_direction: opposite of Opening.
    engine.handle_switch_observed(true);
    assert_eq!(engine.direction(), Some(Direction::Closing));
}

#[test]
fn interpolating_snapshot_while_moving() {
    let mut h = harness(30.0, 0);
    h.engine.move_to(100.0).expect("open");
    h.clock.advance(secs(3));
    let state = h.engine.snapshot();
    assert_eq!(state.position, 10);
    assert_eq!(state.status, CoverStatus::Opening);
    assert_eq!(state.direction, Some(Direction::Opening));
}

#[test]
fn supersession_keeps_exactly_one_armed_stop() {
    let mut h = harness(30.0, 0);
    h.engine.move_to(100.0).expect("open");
    h.clock.advance(secs(5));
    h.engine.move_to(0.0).expect("close");

    // Every new arm is preceded by the cancel of its predecessor.
    let events = h.sched.events();
    let arms: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, SchedulerEvent::Armed { .. }))
        .collect();
    assert_eq!(arms.len(), 2);
    assert_eq!(h.sched.cancel_count(), 1);
}
