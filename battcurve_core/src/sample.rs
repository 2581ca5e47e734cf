//! Discharge samples and the chronological log they form.

use std::time::Duration;

use crate::error::CurveError;

/// One voltage reading taken during the discharge phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageSample {
    /// Time since the discharge phase started.
    pub elapsed: Duration,
    pub voltage: f64,
}

impl VoltageSample {
    pub fn new(elapsed: Duration, voltage: f64) -> Self {
        Self { elapsed, voltage }
    }
}

/// Ordered discharge readings; insertion order is chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DischargeLog {
    samples: Vec<VoltageSample>,
}

impl DischargeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. Its elapsed time must be strictly later than the last one.
    pub fn push(&mut self, sample: VoltageSample) -> Result<(), CurveError> {
        if let Some(last) = self.samples.last()
            && sample.elapsed <= last.elapsed
        {
            return Err(CurveError::State(format!(
                "sample at {:?} does not follow {:?}",
                sample.elapsed, last.elapsed
            )));
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn samples(&self) -> &[VoltageSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VoltageSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&VoltageSample> {
        self.samples.last()
    }
}

impl TryFrom<Vec<VoltageSample>> for DischargeLog {
    type Error = CurveError;

    fn try_from(samples: Vec<VoltageSample>) -> Result<Self, Self::Error> {
        let mut log = DischargeLog::new();
        for s in samples {
            log.push(s)?;
        }
        Ok(log)
    }
}

impl<'a> IntoIterator for &'a DischargeLog {
    type Item = &'a VoltageSample;
    type IntoIter = std::slice::Iter<'a, VoltageSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_strictly_increasing_elapsed() {
        let mut log = DischargeLog::new();
        log.push(VoltageSample::new(Duration::ZERO, 4.19)).unwrap();
        log.push(VoltageSample::new(Duration::from_secs(5), 4.18)).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().map(|s| s.voltage), Some(4.18));
    }

    #[test]
    fn rejects_repeated_or_earlier_elapsed() {
        let mut log = DischargeLog::new();
        log.push(VoltageSample::new(Duration::from_secs(5), 4.19)).unwrap();
        let err = log
            .push(VoltageSample::new(Duration::from_secs(5), 4.18))
            .unwrap_err();
        assert!(matches!(err, CurveError::State(_)));
        assert!(log.push(VoltageSample::new(Duration::from_secs(1), 4.18)).is_err());
        assert_eq!(log.len(), 1);
    }
}
