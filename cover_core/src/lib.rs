#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Travel-time cover position control (hardware-agnostic).
//!
//! A cover driven by a plain on/off switch exposes no position feedback;
//! this crate estimates position from elapsed travel time and computes when
//! to stop the motor so it lands on any requested target.
//!
//! ## Architecture
//!
//! - **Position model**: pure elapsed-time ↔ position arithmetic (`travel`)
//! - **Motion engine**: the single owner/mutator of position and direction
//!   (`engine`), driving the switch through `cover_traits::Switch`
//! - **Stop scheduler**: cancellable one-shot timer, at most one pending
//!   stop per cover (`scheduler`)
//! - **Facade**: serialized long-lived handle implementing
//!   `cover_traits::CoverControl` (`cover`)
//! - **Status**: derivation of the published open/closed/moving status
//!   (`status`)
//!
//! Internals keep position as `f64` percent; the published snapshot rounds
//! to an integer.

pub mod builder;
pub mod config;
pub mod cover;
pub mod engine;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod scheduler;
pub mod status;
pub mod travel;

pub use builder::CoverBuilder;
pub use config::TravelCfg;
pub use cover::Cover;
pub use engine::{ActiveMovement, CoverEngine};
pub use error::{BuildError, CoverError, Result};
pub use scheduler::{MovementId, StopScheduler, StopTimer, TimerHandle};
pub use status::{derive_status, round_position};

pub use cover_traits::{CoverControl, CoverState, CoverStatus, Direction, StateSink, Switch};
