#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Battery cycle control and SOC curve generation (transport-agnostic).
//!
//! All daemon interaction goes through `battcurve_traits::ChargeControl`.
//!
//! ## Architecture
//!
//! - **Cycle**: charge to the upper threshold, then log the discharge down to
//!   the lower one (`cycle` module, phases in `status`)
//! - **Cleanup**: `ChargingGuard` hands charging back to the daemon on every exit
//! - **Curve**: linear-in-time SOC estimates sampled at evenly spaced targets (`curve`)
//! - **Table**: validated lookup table and its JSON document (`table`, `writer`)
//!
//! ## Fixed-Point Voltages
//!
//! Table voltages are stored as **centivolts** (`i32`, 1 cV = 0.01 V) so that
//! deduplication and ordering compare exact integers. See `fixed_point`.

pub mod atomic;
pub mod config;
pub mod control_error;
pub mod conversions;
pub mod curve;
pub mod cycle;
pub mod error;
pub mod fixed_point;
pub mod guard;
pub mod mocks;
pub mod runner;
pub mod sample;
pub mod status;
pub mod table;
pub mod util;
pub mod writer;

pub use config::CycleCfg;
pub use curve::{DEFAULT_NUM_POINTS, MAX_NUM_POINTS, generate};
pub use cycle::{CycleController, CycleControllerBuilder};
pub use error::{BuildError, CurveError};
pub use guard::ChargingGuard;
pub use runner::{RunOutcome, RunParams};
pub use sample::{DischargeLog, VoltageSample};
pub use status::CyclePhase;
pub use table::{SocPoint, SocTable};
pub use writer::{JsonFileWriter, TableWriter};
