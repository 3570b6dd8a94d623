//! Type-state builder for `CoverEngine`.
//!
//! The builder enforces at compile time that the switch and travel config
//! are provided before `build()` is available. `try_build()` is always
//! available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use cover_traits::clock::{Clock, MonotonicClock};
use cover_traits::{CoverState, Direction, StateSink, Switch};

use crate::config::TravelCfg;
use crate::engine::CoverEngine;
use crate::error::{BuildError, Result};
use crate::mocks::NoopSink;
use crate::scheduler::{NullScheduler, StopScheduler};

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `CoverEngine`. All fields are validated on `build()`.
pub struct CoverBuilder<S, T> {
    switch: Option<Box<dyn Switch + Send>>,
    travel: Option<TravelCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    scheduler: Option<Box<dyn StopScheduler + Send>>,
    sink: Option<Box<dyn StateSink + Send>>,
    restore: Option<CoverState>,
    _s: PhantomData<S>,
    _t: PhantomData<T>,
}

impl Default for CoverBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            switch: None,
            travel: None,
            clock: None,
            scheduler: None,
            sink: None,
            restore: None,
            _s: PhantomData,
            _t: PhantomData,
        }
    }
}

impl CoverBuilder<Missing, Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S, T> CoverBuilder<S, T> {
    fn transmute_marker<S2, T2>(self) -> CoverBuilder<S2, T2> {
        CoverBuilder {
            switch: self.switch,
            travel: self.travel,
            clock: self.clock,
            scheduler: self.scheduler,
            sink: self.sink,
            restore: self.restore,
            _s: PhantomData,
            _t: PhantomData,
        }
    }

    pub fn with_switch(mut self, switch: impl Switch + Send + 'static) -> CoverBuilder<Set, T> {
        self.switch = Some(Box::new(switch));
        self.transmute_marker()
    }

    pub fn with_travel(mut self, travel: TravelCfg) -> CoverBuilder<S, Set> {
        self.travel = Some(travel);
        self.transmute_marker()
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn with_scheduler(
        mut self,
        scheduler: impl StopScheduler + Send + 'static,
    ) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    pub fn with_sink(mut self, sink: impl StateSink + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Seed from a previously published snapshot (restored state takes
    /// precedence over `TravelCfg::initial_position`).
    pub fn restore_state(mut self, state: CoverState) -> Self {
        self.restore = Some(state);
        self
    }

    /// Dynamic-checked build; errors on missing switch or travel config.
    pub fn try_build(self) -> Result<CoverEngine<Box<dyn Switch + Send>>> {
        let switch = self
            .switch
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSwitch))?;
        let travel = self
            .travel
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTravel))?;
        validate_and_build(
            switch,
            travel,
            self.clock,
            self.scheduler,
            self.sink,
            self.restore,
        )
    }
}

impl CoverBuilder<Set, Set> {
    /// Validate and construct; compile-time guaranteed to have its inputs.
    pub fn build(self) -> Result<CoverEngine<Box<dyn Switch + Send>>> {
        self.try_build()
    }
}

/// Validate configuration and construct a `CoverEngine`.
///
/// This is the single source of truth for validation and construction.
fn validate_and_build(
    switch: Box<dyn Switch + Send>,
    travel: TravelCfg,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    scheduler: Option<Box<dyn StopScheduler + Send>>,
    sink: Option<Box<dyn StateSink + Send>>,
    restore: Option<CoverState>,
) -> Result<CoverEngine<Box<dyn Switch + Send>>> {
    if !travel.travel_time_s.is_finite() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "travel_time_s must be finite",
        )));
    }
    if !(1.0..=300.0).contains(&travel.travel_time_s) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "travel_time_s must be within [1, 300]",
        )));
    }
    if travel.initial_position > 100 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "initial_position must be within [0, 100]",
        )));
    }

    let clock = clock.unwrap_or_else(|| Arc::new(MonotonicClock::new()));
    let scheduler = scheduler.unwrap_or_else(|| Box::new(NullScheduler));
    let sink = sink.unwrap_or_else(|| Box::new(NoopSink));

    let (position, last_direction) = match restore {
        Some(state) => (
            f64::from(state.position.min(100)),
            state.last_direction,
        ),
        None => (f64::from(travel.initial_position), Direction::Closing),
    };

    Ok(CoverEngine {
        switch,
        clock,
        scheduler,
        sink,
        travel_time: travel.travel_time(),
        position,
        active: None,
        last_direction,
        switch_on: false,
        next_movement: 0,
    })
}
