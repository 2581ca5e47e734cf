//! Device-control protocol client for the battery daemon.
//!
//! The daemon speaks a line protocol over TCP: one request line per
//! connection, answered by one response line that may be surrounded by
//! button notifications. [`ProtocolClient`] implements
//! [`battcurve_traits::ChargeControl`] on top of it; [`SimulatedBattery`]
//! implements the same trait without any daemon.
pub mod client;
pub mod error;
pub mod response;
pub mod sim;

pub use client::{ClientCfg, ProtocolClient};
pub use error::ProtocolError;
pub use sim::SimulatedBattery;
