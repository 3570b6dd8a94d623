use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CoverError {
    #[error("actuator error: {0}")]
    Actuator(String),
    #[error("actuator unavailable: {0}")]
    ActuatorUnavailable(String),
    #[error("scheduler error: {0}")]
    Scheduler(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing switch")]
    MissingSwitch,
    #[error("missing travel config")]
    MissingTravel,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
