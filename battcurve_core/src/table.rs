//! SOC/voltage lookup table and its persisted document form.
//!
//! A table is a list of `(voltage, soc)` points sorted by voltage descending,
//! with pairwise distinct voltages, 100% at the top and 0% at the bottom. On
//! disk it is `{"battery_curve": [[4.19, 100], ..., [3.1, 0]]}`, the shape
//! the battery daemon reads as a custom curve.

use serde::de::{Deserializer, Error as _};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::CurveError;
use crate::fixed_point::{cv_to_volts, round_soc, volts_to_cv};

/// One table entry. Voltage is held in centivolts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocPoint {
    pub(crate) cv: i32,
    pub(crate) soc: u8,
}

impl SocPoint {
    /// Build a point, rounding `voltage` to two decimals.
    pub fn new(voltage: f64, soc: u8) -> Self {
        Self {
            cv: volts_to_cv(voltage),
            soc: soc.min(100),
        }
    }

    pub fn from_centivolts(cv: i32, soc: u8) -> Self {
        Self { cv, soc: soc.min(100) }
    }

    /// Voltage rounded to two decimals.
    pub fn voltage(&self) -> f64 {
        cv_to_volts(self.cv)
    }

    pub fn centivolts(&self) -> i32 {
        self.cv
    }

    pub fn soc(&self) -> u8 {
        self.soc
    }
}

impl Serialize for SocPoint {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        (self.voltage(), self.soc).serialize(s)
    }
}

// Hand-written curves may carry fractional percentages; those are rounded.
impl<'de> Deserialize<'de> for SocPoint {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let (voltage, soc) = <(f64, f64)>::deserialize(d)?;
        if !voltage.is_finite() || voltage <= 0.0 {
            return Err(D::Error::custom(format!("invalid voltage {voltage}")));
        }
        if !(0.0..=100.0).contains(&soc) {
            return Err(D::Error::custom(format!("soc {soc} outside 0..=100")));
        }
        Ok(SocPoint::new(voltage, round_soc(soc)))
    }
}

#[derive(Serialize)]
struct CurveDocumentRef<'a> {
    battery_curve: &'a [SocPoint],
}

#[derive(Deserialize)]
struct CurveDocument {
    battery_curve: Vec<SocPoint>,
}

/// Immutable lookup table, highest voltage first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocTable {
    points: Vec<SocPoint>,
}

impl SocTable {
    /// Wrap points that satisfy the table invariants.
    pub fn new(points: Vec<SocPoint>) -> Result<Self, CurveError> {
        validate_points(&points)?;
        Ok(Self { points })
    }

    /// Caller guarantees the invariants (the generator builds them in).
    pub(crate) fn from_sorted(points: Vec<SocPoint>) -> Self {
        debug_assert!(validate_points(&points).is_ok());
        Self { points }
    }

    pub fn points(&self) -> &[SocPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&SocPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SocPoint> {
        self.points.last()
    }

    /// Re-check the structural invariants.
    pub fn validate(&self) -> Result<(), CurveError> {
        validate_points(&self.points)
    }

    /// True when SOC never rises as voltage falls.
    ///
    /// The generator does not enforce this; noisy discharge data can produce a
    /// dip. The daemon rejects such curves, so callers should check it.
    pub fn is_monotonic(&self) -> bool {
        self.points.windows(2).all(|w| w[0].soc >= w[1].soc)
    }

    /// Battery level (0..=100) for `voltage`, interpolating linearly between
    /// neighbouring points. Clamped to the first point's SOC above the table
    /// and the last point's SOC below it.
    pub fn level_at(&self, voltage: f64) -> f64 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return 0.0;
        };
        if voltage >= first.voltage() {
            return f64::from(first.soc);
        }
        if voltage <= last.voltage() {
            return f64::from(last.soc);
        }
        for w in self.points.windows(2) {
            let (hi, lo) = (w[0], w[1]);
            if voltage <= hi.voltage() && voltage >= lo.voltage() {
                let span = hi.voltage() - lo.voltage();
                let frac = (voltage - lo.voltage()) / span;
                return f64::from(lo.soc) + frac * (f64::from(hi.soc) - f64::from(lo.soc));
            }
        }
        f64::from(last.soc)
    }

    /// Render the persisted document.
    pub fn to_json(&self) -> Result<String, CurveError> {
        serde_json::to_string(&CurveDocumentRef {
            battery_curve: &self.points,
        })
        .map_err(|e| CurveError::Persistence(e.to_string()))
    }

    /// Parse and validate a persisted document.
    pub fn from_json(s: &str) -> Result<Self, CurveError> {
        let doc: CurveDocument =
            serde_json::from_str(s).map_err(|e| CurveError::InvalidTable(e.to_string()))?;
        Self::new(doc.battery_curve)
    }
}

fn validate_points(points: &[SocPoint]) -> Result<(), CurveError> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(CurveError::InvalidTable("table is empty".into()));
    };
    for (i, w) in points.windows(2).enumerate() {
        if w[1].cv >= w[0].cv {
            return Err(CurveError::InvalidTable(format!(
                "voltages must be distinct and descending: {} then {} at index {}",
                w[0].voltage(),
                w[1].voltage(),
                i + 1
            )));
        }
    }
    if first.soc != 100 {
        return Err(CurveError::InvalidTable(format!(
            "highest voltage {} must map to 100%, got {}",
            first.voltage(),
            first.soc
        )));
    }
    if points.len() > 1 && last.soc != 0 {
        return Err(CurveError::InvalidTable(format!(
            "lowest voltage {} must map to 0%, got {}",
            last.voltage(),
            last.soc
        )));
    }
    Ok(())
}
