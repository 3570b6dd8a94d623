//! Cancellable one-shot stop scheduling.
//!
//! The engine arms at most one pending stop per cover. `StopTimer` runs a
//! worker thread that owns the deadline; arming, rearming (implicit cancel)
//! and cancelling go over a control channel, and the fire callback carries
//! the movement id so a stale fire can be recognized and dropped.
//!
//! Safety: each `StopTimer` spawns exactly one thread that is shut down and
//! joined when the timer is dropped, preventing thread leaks.

use crossbeam_channel as xch;
use std::time::{Duration, Instant};

use crate::error::{CoverError, Result};

/// Identity of a movement; increases monotonically per cover.
pub type MovementId = u64;

/// One pending deferred stop, at most. `schedule` implicitly cancels any
/// previously armed stop; `cancel` is idempotent and safe with nothing armed.
pub trait StopScheduler {
    fn schedule(&mut self, after: Duration, movement: MovementId) -> Result<()>;
    fn cancel(&mut self);
}

/// Placeholder wired before a real timer exists. Arming fails, which the
/// engine treats as a scheduler fault (motor forced off).
#[derive(Debug, Default)]
pub struct NullScheduler;

impl StopScheduler for NullScheduler {
    fn schedule(&mut self, _after: Duration, _movement: MovementId) -> Result<()> {
        Err(eyre::Report::new(CoverError::Scheduler(
            "no stop scheduler wired".into(),
        )))
    }

    fn cancel(&mut self) {}
}

enum TimerMsg {
    Arm { after: Duration, movement: MovementId },
    Cancel,
    Shutdown,
}

/// Thread-backed one-shot timer. The worker waits on the control channel
/// with a deadline-bounded timeout; expiry invokes the fire callback.
pub struct StopTimer {
    tx: xch::Sender<TimerMsg>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

/// Cheap, clonable arming handle for a `StopTimer`.
#[derive(Clone)]
pub struct TimerHandle {
    tx: xch::Sender<TimerMsg>,
}

impl StopTimer {
    pub fn spawn<F: Fn(MovementId) + Send + 'static>(on_fire: F) -> Self {
        let (tx, rx) = xch::unbounded();

        let join_handle = std::thread::spawn(move || {
            let mut armed: Option<(Instant, MovementId)> = None;
            loop {
                let msg = match armed {
                    Some((deadline, movement)) => {
                        let now = Instant::now();
                        if deadline <= now {
                            armed = None;
                            on_fire(movement);
                            continue;
                        }
                        match rx.recv_timeout(deadline - now) {
                            Ok(m) => m,
                            Err(xch::RecvTimeoutError::Timeout) => {
                                armed = None;
                                on_fire(movement);
                                continue;
                            }
                            Err(xch::RecvTimeoutError::Disconnected) => break,
                        }
                    }
                    None => match rx.recv() {
                        Ok(m) => m,
                        Err(_) => break,
                    },
                };

                match msg {
                    TimerMsg::Arm { after, movement } => {
                        armed = Some((Instant::now() + after, movement));
                    }
                    TimerMsg::Cancel => armed = None,
                    TimerMsg::Shutdown => break,
                }
            }
            tracing::trace!("stop timer thread exiting cleanly");
        });

        Self {
            tx,
            join_handle: Some(join_handle),
        }
    }

    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            tx: self.tx.clone(),
        }
    }
}

impl Drop for StopTimer {
    fn drop(&mut self) {
        // Engine handles may still hold sender clones; an explicit shutdown
        // message stops the worker regardless.
        let _ = self.tx.send(TimerMsg::Shutdown);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("stop timer thread joined"),
                Err(e) => tracing::warn!(?e, "stop timer thread panicked during shutdown"),
            }
        }
    }
}

impl StopScheduler for TimerHandle {
    fn schedule(&mut self, after: Duration, movement: MovementId) -> Result<()> {
        self.tx
            .send(TimerMsg::Arm { after, movement })
            .map_err(|_| {
                eyre::Report::new(CoverError::Scheduler("stop timer thread is gone".into()))
            })
    }

    fn cancel(&mut self) {
        let _ = self.tx.send(TimerMsg::Cancel);
    }
}
