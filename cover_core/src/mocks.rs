//! Test and helper doubles for cover_core.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cover_traits::{CoverState, StateSink, Switch};

use crate::error::{CoverError, Result};
use crate::scheduler::{MovementId, StopScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCall {
    On,
    Off,
}

/// Switch that records every transition it is asked to make.
#[derive(Clone, Default)]
pub struct MockSwitch {
    calls: Arc<Mutex<Vec<SwitchCall>>>,
}

impl MockSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SwitchCall> {
        self.calls.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn on_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == SwitchCall::On)
            .count()
    }

    pub fn off_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == SwitchCall::Off)
            .count()
    }
}

impl Switch for MockSwitch {
    fn turn_on(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut v) = self.calls.lock() {
            v.push(SwitchCall::On);
        }
        Ok(())
    }

    fn turn_off(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut v) = self.calls.lock() {
            v.push(SwitchCall::Off);
        }
        Ok(())
    }
}

/// Switch whose calls all fail; exercises the rejected-command paths.
#[derive(Debug, Default)]
pub struct FailingSwitch;

impl Switch for FailingSwitch {
    fn turn_on(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err("switch entity unavailable".into())
    }

    fn turn_off(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err("switch entity unavailable".into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    Armed {
        after: Duration,
        movement: MovementId,
    },
    Cancelled,
}

/// Scheduler that records arm/cancel without any thread; tests fire the
/// engine callback themselves after advancing a `ManualClock`.
#[derive(Clone, Default)]
pub struct RecordingScheduler {
    events: Arc<Mutex<Vec<SchedulerEvent>>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SchedulerEvent> {
        self.events.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// The most recently armed stop, if any arm happened at all.
    pub fn last_armed(&self) -> Option<(Duration, MovementId)> {
        self.events().iter().rev().find_map(|e| match e {
            SchedulerEvent::Armed { after, movement } => Some((*after, *movement)),
            SchedulerEvent::Cancelled => None,
        })
    }

    pub fn cancel_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| **e == SchedulerEvent::Cancelled)
            .count()
    }
}

impl StopScheduler for RecordingScheduler {
    fn schedule(&mut self, after: Duration, movement: MovementId) -> Result<()> {
        if let Ok(mut v) = self.events.lock() {
            v.push(SchedulerEvent::Armed { after, movement });
        }
        Ok(())
    }

    fn cancel(&mut self) {
        if let Ok(mut v) = self.events.lock() {
            v.push(SchedulerEvent::Cancelled);
        }
    }
}

/// Scheduler that refuses to arm; exercises the fail-safe path.
#[derive(Debug, Default)]
pub struct FailingScheduler;

impl StopScheduler for FailingScheduler {
    fn schedule(&mut self, _after: Duration, _movement: MovementId) -> Result<()> {
        Err(eyre::Report::new(CoverError::Scheduler(
            "timer backend down".into(),
        )))
    }

    fn cancel(&mut self) {}
}

/// Sink that stores every published snapshot.
#[derive(Clone, Default)]
pub struct MemorySink {
    states: Arc<Mutex<Vec<CoverState>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<CoverState> {
        self.states.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<CoverState> {
        self.states().last().copied()
    }
}

impl StateSink for MemorySink {
    fn publish(
        &mut self,
        state: &CoverState,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut v) = self.states.lock() {
            v.push(*state);
        }
        Ok(())
    }
}

/// Sink that drops everything; the engine default.
#[derive(Debug, Default)]
pub struct NoopSink;

impl StateSink for NoopSink {
    fn publish(
        &mut self,
        _state: &CoverState,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Sink that always fails; publish errors must never block commands.
#[derive(Debug, Default)]
pub struct FailingSink;

impl StateSink for FailingSink {
    fn publish(
        &mut self,
        _state: &CoverState,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err("helper store offline".into())
    }
}
