use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("daemon unreachable: {0}")]
    Connection(String),
    #[error("insufficient data: no discharge sample with a positive voltage")]
    InsufficientData,
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("interrupted")]
    Interrupted,
    #[error("{phase} phase exceeded {limit_ms} ms")]
    PhaseTimeout { phase: &'static str, limit_ms: u64 },
    #[error("invalid curve table: {0}")]
    InvalidTable(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing battery controller")]
    MissingBattery,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
