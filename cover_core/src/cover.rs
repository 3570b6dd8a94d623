//! The cover facade: one long-lived handle per configured cover.
//!
//! Wraps the engine behind a single lock so commands, the timer fire and
//! switch feedback are serialized, and owns the stop timer whose callback
//! points back into the engine. Implements `CoverControl` for the host
//! boundary.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use cover_traits::{CoverControl, CoverState, Switch};

use crate::builder::{CoverBuilder, Missing};
use crate::engine::CoverEngine;
use crate::error::{CoverError, Result};
use crate::scheduler::StopTimer;
use crate::travel::FULL_SPAN;

type BoxedEngine = CoverEngine<Box<dyn Switch + Send>>;

pub struct Cover {
    engine: Arc<Mutex<BoxedEngine>>,
    // Held for its Drop: joins the timer thread on teardown.
    _timer: StopTimer,
}

impl Cover {
    /// Start building a cover (switch + travel config required).
    pub fn builder() -> CoverBuilder<Missing, Missing> {
        CoverBuilder::default()
    }

    /// Wrap a built engine, spawning the stop timer and wiring its fire
    /// callback back into the engine.
    pub fn new(engine: BoxedEngine) -> Self {
        let engine = Arc::new(Mutex::new(engine));
        let weak: Weak<Mutex<BoxedEngine>> = Arc::downgrade(&engine);
        let timer = StopTimer::spawn(move |movement| {
            let Some(engine) = weak.upgrade() else {
                return; // cover torn down; nothing to stop
            };
            match engine.lock() {
                Ok(mut e) => e.on_scheduled_stop(movement),
                Err(_) => tracing::error!(movement, "engine lock poisoned; stop fire dropped"),
            }
        });
        if let Ok(mut e) = engine.lock() {
            e.set_scheduler(Box::new(timer.handle()));
        }
        Self {
            engine,
            _timer: timer,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BoxedEngine>> {
        self.engine
            .lock()
            .map_err(|_| eyre::Report::new(CoverError::State("engine lock poisoned".into())))
    }

    /// Snapshot of the current state (interpolating while moving).
    pub fn state(&self) -> Result<CoverState> {
        Ok(self.lock()?.snapshot())
    }

    /// Move to a position percentage with a rich error report. The
    /// `CoverControl` surface erases this to a boxed error for host
    /// embedding.
    pub fn move_to_percent(&self, position: i64) -> Result<()> {
        self.lock()?.move_to(position as f64)
    }

    /// Halt any in-flight movement; the actuator is off when this returns.
    pub fn halt(&self) -> Result<()> {
        self.lock()?.stop()
    }

    /// Feed an externally observed switch toggle into the estimator.
    pub fn observed_switch(&self, on: bool) -> Result<()> {
        self.lock()?.handle_switch_observed(on);
        Ok(())
    }

    /// Adjust the full-travel time at runtime (clamped to [1, 300] s).
    pub fn set_travel_time(&self, seconds: f32) -> Result<()> {
        self.lock()?.set_travel_time(seconds)
    }

    /// Manually correct the position estimate (clamped to [0, 100]).
    pub fn override_position(&self, position: i64) -> Result<()> {
        self.lock()?.override_position(position as f64)
    }
}

impl core::fmt::Debug for Cover {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.engine.lock() {
            Ok(e) => f
                .debug_struct("Cover")
                .field("position", &e.estimated_position())
                .field("direction", &e.direction())
                .finish(),
            Err(_) => f.debug_struct("Cover").field("poisoned", &true).finish(),
        }
    }
}

impl CoverControl for Cover {
    fn open(&self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.lock()
            .and_then(|mut e| e.move_to(FULL_SPAN))
            .map_err(Into::into)
    }

    fn close(&self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.lock().and_then(|mut e| e.move_to(0.0)).map_err(Into::into)
    }

    fn set_position(
        &self,
        position: i64,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.move_to_percent(position).map_err(Into::into)
    }

    fn stop(&self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.halt().map_err(Into::into)
    }
}
