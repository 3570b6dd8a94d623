//! The motion state machine (`CoverEngine`).
//!
//! Owns the position/direction estimate for one cover and is the only writer
//! of it. Commands, the scheduled-stop fire, and externally observed switch
//! toggles all funnel through here; the facade serializes them behind one
//! lock so every handler runs to completion against a consistent state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cover_traits::clock::Clock;
use cover_traits::{CoverState, Direction, StateSink, Switch};
use eyre::WrapErr;

use crate::error::{CoverError, Result};
use crate::hw_error::map_hw_error;
use crate::scheduler::{MovementId, StopScheduler};
use crate::status::{derive_status, round_position};
use crate::travel;

/// One in-flight movement. Present iff the cover is not idle; direction and
/// target live inside so "moving without a direction" is unrepresentable.
#[derive(Debug, Clone, Copy)]
pub struct ActiveMovement {
    pub id: MovementId,
    pub started_at: Instant,
    pub start_position: f64,
    pub target: f64,
    pub direction: Direction,
    /// Scheduled travel duration; `None` for externally started movements
    /// whose stop moment is unknown (nothing armed).
    pub planned: Option<Duration>,
}

/// Travel-time position estimator and motion controller for a single cover.
pub struct CoverEngine<W: Switch> {
    pub(crate) switch: W,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) scheduler: Box<dyn StopScheduler + Send>,
    pub(crate) sink: Box<dyn StateSink + Send>,
    pub(crate) travel_time: Duration,

    pub(crate) position: f64,
    pub(crate) active: Option<ActiveMovement>,
    pub(crate) last_direction: Direction,
    /// Last actuator state this engine commanded or observed. The engine is
    /// the exclusive driver of the switch, so this tracks reality unless an
    /// external toggle arrives (which updates it via feedback).
    pub(crate) switch_on: bool,
    pub(crate) next_movement: MovementId,
}

impl<W: Switch> core::fmt::Debug for CoverEngine<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CoverEngine")
            .field("position", &self.position)
            .field("direction", &self.active.map(|m| m.direction))
            .field("switch_on", &self.switch_on)
            .finish()
    }
}

impl<W: Switch> CoverEngine<W> {
    /// Current best position estimate, interpolating while a movement is in
    /// flight. Elapsed time is capped at the planned duration so the
    /// estimate never overshoots the target.
    pub fn estimated_position(&self) -> f64 {
        match &self.active {
            Some(m) => {
                let elapsed = self.clock.elapsed_since(m.started_at);
                let capped = m.planned.map_or(elapsed, |d| elapsed.min(d));
                travel::position_after(m.start_position, m.direction, capped, self.travel_time)
            }
            None => self.position,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.active.map(|m| m.direction)
    }

    pub fn is_moving(&self) -> bool {
        self.active.is_some()
    }

    pub fn travel_time(&self) -> Duration {
        self.travel_time
    }

    /// Snapshot for external readers. Never hands out mutable state.
    pub fn snapshot(&self) -> CoverState {
        let position = self.estimated_position();
        let direction = self.direction();
        CoverState {
            position: round_position(position),
            direction,
            last_direction: self.last_direction,
            status: derive_status(position, direction),
        }
    }

    /// Move toward `target` percent (clamped to [0, 100]).
    ///
    /// Supersedes any in-flight movement: the old movement is finalized at
    /// its elapsed-time estimate and its scheduled stop cancelled before the
    /// new one is planned. The actuator is only cycled off/on when the
    /// direction changes; a same-direction retarget keeps it running.
    pub fn move_to(&mut self, target: f64) -> Result<()> {
        let target = travel::clamp_position(target);
        let prev_direction = self.direction();
        self.finalize_active();

        let Some((direction, duration)) = travel::plan_move(self.position, target, self.travel_time)
        else {
            // Target equals the current estimate: a no-op, not a movement.
            self.ensure_off()?;
            self.publish();
            return Ok(());
        };

        if self.switch_on && prev_direction != Some(direction) {
            self.ensure_off()?;
        }
        if let Err(e) = self.ensure_on() {
            tracing::warn!(error = %e, "actuator rejected turn_on; command dropped");
            return Err(e);
        }

        let id = self.next_movement_id();
        let movement = ActiveMovement {
            id,
            started_at: self.clock.now(),
            start_position: self.position,
            target,
            direction,
            planned: Some(duration),
        };

        if let Err(e) = self.scheduler.schedule(duration, id) {
            // Fail safe: never leave the motor running unsupervised.
            if let Err(off) = self.switch.turn_off() {
                tracing::error!(error = %map_hw_error(&*off), "turn_off failed after scheduler fault");
            }
            self.switch_on = false;
            self.publish();
            tracing::error!(error = %e, "failed to arm scheduled stop");
            return Err(e);
        }

        tracing::debug!(
            from = self.position,
            target,
            direction = direction.as_str(),
            duration_ms = duration.as_millis() as u64,
            "movement started"
        );
        self.active = Some(movement);
        self.last_direction = direction;
        self.publish();
        Ok(())
    }

    /// Halt any in-flight movement immediately. The actuator is turned off
    /// before this returns; position freezes at the elapsed-time estimate.
    /// A no-op while idle.
    pub fn stop(&mut self) -> Result<()> {
        if self.active.is_none() {
            return Ok(());
        }
        // Actuator first: if the switch rejects the call the movement stays
        // active and the armed stop keeps supervising the motor.
        self.ensure_off()?;
        self.finalize_active();
        self.publish();
        Ok(())
    }

    /// Scheduled-stop fire. The firing itself is evidence the planned travel
    /// elapsed, so position snaps to the target exactly instead of being
    /// recomputed (sheds interpolation drift at arrival). Stale fires for
    /// superseded movements are dropped.
    pub fn on_scheduled_stop(&mut self, movement: MovementId) {
        if !self.active.as_ref().is_some_and(|m| m.id == movement) {
            tracing::debug!(movement, "stale scheduled stop ignored");
            return;
        }
        if let Some(m) = self.active.take() {
            self.position = m.target;
            if let Err(e) = self.switch.turn_off() {
                tracing::error!(error = %map_hw_error(&*e), "turn_off failed on scheduled stop");
            }
            self.switch_on = false;
            tracing::debug!(position = self.position, "movement completed");
            self.publish();
        }
    }

    /// Feedback for switch toggles this engine did not command (another
    /// automation, manual override).
    pub fn handle_switch_observed(&mut self, on: bool) {
        if on {
            if self.active.is_some() {
                // Echo of our own command; nothing to learn.
                self.switch_on = true;
                return;
            }
            self.switch_on = true;
            let direction = if self.position <= 0.0 {
                Direction::Opening
            } else if self.position >= travel::FULL_SPAN {
                Direction::Closing
            } else {
                self.last_direction.reversed()
            };
            let target = match direction {
                Direction::Opening => travel::FULL_SPAN,
                Direction::Closing => 0.0,
            };
            let id = self.next_movement_id();
            self.active = Some(ActiveMovement {
                id,
                started_at: self.clock.now(),
                start_position: self.position,
                target,
                direction,
                planned: None,
            });
            self.last_direction = direction;
            tracing::info!(
                direction = direction.as_str(),
                "externally started movement; tracking without a scheduled stop"
            );
            self.publish();
        } else {
            self.switch_on = false;
            if self.active.is_some() {
                self.finalize_active();
                tracing::info!(position = self.position, "externally stopped movement");
                self.publish();
            }
        }
    }

    /// Adjust the full-travel time at runtime (clamped to [1, 300] s). An
    /// in-flight movement is finalized at the old rate and re-planned to the
    /// same target at the new rate.
    pub fn set_travel_time(&mut self, seconds: f32) -> Result<()> {
        if !seconds.is_finite() {
            return Err(eyre::Report::new(CoverError::Config(
                "travel time must be finite".into(),
            )));
        }
        let clamped = seconds.clamp(1.0, 300.0);
        let resume_target = self.active.map(|m| m.target);
        if let Some(target) = resume_target {
            self.finalize_active();
            self.travel_time = Duration::from_secs_f64(f64::from(clamped));
            self.move_to(target)
        } else {
            self.travel_time = Duration::from_secs_f64(f64::from(clamped));
            Ok(())
        }
    }

    /// Manual position correction: trust the caller, drop any tracking
    /// without an elapsed-time update, and force the actuator off.
    pub fn override_position(&mut self, position: f64) -> Result<()> {
        self.ensure_off()?;
        if self.active.take().is_some() {
            self.scheduler.cancel();
        }
        self.position = travel::clamp_position(position);
        self.publish();
        Ok(())
    }

    /// Wire the real scheduler after construction (the facade owns the timer
    /// whose callback points back at this engine).
    pub fn set_scheduler(&mut self, scheduler: Box<dyn StopScheduler + Send>) {
        self.scheduler = scheduler;
    }

    // ── Private ──────────────────────────────────────────────────────────────

    /// Finalize the in-flight movement, if any: overwrite `position` with the
    /// elapsed-time estimate (capped at the planned duration) and disarm the
    /// scheduled stop. Does not touch the actuator.
    fn finalize_active(&mut self) {
        let Some(m) = self.active.take() else {
            return;
        };
        let elapsed = self.clock.elapsed_since(m.started_at);
        let capped = m.planned.map_or(elapsed, |d| elapsed.min(d));
        self.position = travel::position_after(m.start_position, m.direction, capped, self.travel_time);
        self.scheduler.cancel();
    }

    fn ensure_on(&mut self) -> Result<()> {
        if self.switch_on {
            return Ok(());
        }
        self.switch
            .turn_on()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("turn_on")?;
        self.switch_on = true;
        Ok(())
    }

    fn ensure_off(&mut self) -> Result<()> {
        if !self.switch_on {
            return Ok(());
        }
        self.switch
            .turn_off()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("turn_off")?;
        self.switch_on = false;
        Ok(())
    }

    fn next_movement_id(&mut self) -> MovementId {
        self.next_movement += 1;
        self.next_movement
    }

    /// Fire-and-forget publication; failures never block the state machine.
    fn publish(&mut self) {
        let state = self.snapshot();
        if let Err(e) = self.sink.publish(&state) {
            tracing::warn!(error = %e, "state publish failed");
        }
    }
}
