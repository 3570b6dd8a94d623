//! Builder validation: every rejected configuration carries a typed error.

use cover_core::mocks::MockSwitch;
use cover_core::{BuildError, Cover, TravelCfg};
use rstest::rstest;

#[test]
fn missing_switch_is_reported() {
    let err = Cover::builder()
        .with_travel(TravelCfg::default())
        .try_build()
        .expect_err("must fail without a switch");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingSwitch)
    ));
}

#[test]
fn missing_travel_is_reported() {
    let err = Cover::builder()
        .with_switch(MockSwitch::new())
        .try_build()
        .expect_err("must fail without travel config");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingTravel)
    ));
}

#[rstest]
#[case(0.5)]
#[case(0.0)]
#[case(-3.0)]
#[case(300.5)]
#[case(f32::NAN)]
#[case(f32::INFINITY)]
fn out_of_range_travel_time_is_rejected(#[case] travel_time_s: f32) {
    let err = Cover::builder()
        .with_switch(MockSwitch::new())
        .with_travel(TravelCfg {
            travel_time_s,
            initial_position: 0,
        })
        .build()
        .expect_err("must reject travel time");
    assert!(
        format!("{err}").contains("travel_time_s"),
        "unexpected message: {err}"
    );
}

#[test]
fn out_of_range_initial_position_is_rejected() {
    let err = Cover::builder()
        .with_switch(MockSwitch::new())
        .with_travel(TravelCfg {
            travel_time_s: 30.0,
            initial_position: 150,
        })
        .build()
        .expect_err("must reject initial position");
    assert!(
        format!("{err}").contains("initial_position"),
        "unexpected message: {err}"
    );
}

#[rstest]
#[case(1.0)]
#[case(300.0)]
fn boundary_travel_times_are_accepted(#[case] travel_time_s: f32) {
    Cover::builder()
        .with_switch(MockSwitch::new())
        .with_travel(TravelCfg {
            travel_time_s,
            initial_position: 100,
        })
        .build()
        .expect("boundary values are valid");
}
