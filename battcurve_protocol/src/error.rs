use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("cannot resolve daemon address {0}")]
    Resolve(String),
    #[error("cannot connect to daemon at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("no usable response line (all lines empty or event notifications)")]
    NoResponse,
    #[error("unexpected response to `{request}`: {line:?}")]
    UnexpectedResponse { request: String, line: String },
    #[error("invalid voltage value {0:?}")]
    InvalidVoltage(String),
    #[error("set_allow_charging {enabled} rejected: {line:?}")]
    ChargingRejected { enabled: bool, line: String },
}

impl ProtocolError {
    /// True when the daemon could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Resolve(_) | Self::Connect { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
