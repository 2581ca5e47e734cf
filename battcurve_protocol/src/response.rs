//! Response-line handling for the line-oriented daemon protocol.
//!
//! The daemon answers each request with one line, but any connection may also
//! carry asynchronous button notifications (`single`, `double`, `long`). These
//! helpers strip the noise and interpret what is left.

use crate::error::{ProtocolError, Result};

/// Field name the daemon uses for the battery voltage.
pub const VOLTAGE_KEY: &str = "battery_v";
/// Token the daemon answers with when a `set_*` command succeeded.
pub const ACK_TOKEN: &str = "done";

/// Return the last non-blank line of `buf` that is not an event notification.
///
/// Bytes are decoded lossily; each line is trimmed before filtering.
pub fn last_meaningful_line<S: AsRef<str>>(buf: &[u8], event_prefixes: &[S]) -> Result<String> {
    let text = String::from_utf8_lossy(buf);
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            !event_prefixes
                .iter()
                .any(|p| !p.as_ref().is_empty() && line.starts_with(p.as_ref()))
        })
        .last()
        .map(str::to_string)
        .ok_or(ProtocolError::NoResponse)
}

/// Parse a `battery_v:<float>` line.
pub fn parse_voltage(line: &str) -> Result<f64> {
    let unexpected = || ProtocolError::UnexpectedResponse {
        request: format!("get {VOLTAGE_KEY}"),
        line: line.to_string(),
    };
    let (key, value) = line.split_once(':').ok_or_else(unexpected)?;
    if key.trim() != VOLTAGE_KEY {
        return Err(unexpected());
    }
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ProtocolError::InvalidVoltage(value.to_string())),
    }
}

/// True when `line` carries the acknowledgement token (case-insensitive).
pub fn is_acknowledged(line: &str) -> bool {
    line.to_ascii_lowercase().contains(ACK_TOKEN)
}
