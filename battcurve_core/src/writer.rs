//! Table persistence.

use std::path::Path;

use crate::atomic::write_atomic;
use crate::error::CurveError;
use crate::table::SocTable;

/// Persists a finished table to a destination.
pub trait TableWriter {
    fn write(&self, table: &SocTable, dest: &Path) -> Result<(), CurveError>;
}

/// Writes the `{"battery_curve": [...]}` document, replacing the file atomically.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileWriter {
    pretty: bool,
}

impl JsonFileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// One point per line instead of a single line.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn render(&self, table: &SocTable) -> Result<String, CurveError> {
        let compact = table.to_json()?;
        if !self.pretty {
            return Ok(compact + "\n");
        }
        let mut out = String::from("{\"battery_curve\": [\n");
        let n = table.len();
        for (i, p) in table.points().iter().enumerate() {
            let entry = serde_json::to_string(p).map_err(|e| CurveError::Persistence(e.to_string()))?;
            out.push_str("  ");
            out.push_str(&entry);
            if i + 1 < n {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str("]}\n");
        Ok(out)
    }
}

impl TableWriter for JsonFileWriter {
    fn write(&self, table: &SocTable, dest: &Path) -> Result<(), CurveError> {
        let body = self.render(table)?;
        write_atomic(dest, body.as_bytes())
            .map_err(|e| CurveError::Persistence(format!("{}: {e}", dest.display())))?;
        tracing::info!(path = %dest.display(), points = table.len(), "curve written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SocPoint;

    fn sample() -> SocTable {
        SocTable::new(vec![
            SocPoint::new(4.19, 100),
            SocPoint::new(3.8, 67),
            SocPoint::new(3.1, 0),
        ])
        .unwrap()
    }

    #[test]
    fn compact_output_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("battery_curve.json");
        JsonFileWriter::new().write(&sample(), &path).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body, "{\"battery_curve\":[[4.19,100],[3.8,67],[3.1,0]]}\n");
        assert_eq!(SocTable::from_json(&body).unwrap(), sample());
    }

    #[test]
    fn pretty_output_is_one_point_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("battery_curve.json");
        JsonFileWriter::new().pretty(true).write(&sample(), &path).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body.lines().count(), 5);
        assert_eq!(SocTable::from_json(&body).unwrap(), sample());
    }

    #[test]
    fn unwritable_destination_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("battery_curve.json");
        let err = JsonFileWriter::new().write(&sample(), &path).unwrap_err();
        assert!(matches!(err, CurveError::Persistence(_)));
    }
}
