//! Maps `Box<dyn Error>` from the device seam to typed `CurveError`.
//!
//! `battcurve_traits::ChargeControl` uses `Box<dyn Error + Send + Sync>` so any
//! transport can sit behind it; this module converts those errors to our typed
//! enum, with an optional feature-gated path for `ProtocolError` downcasting.

use crate::error::CurveError;

/// Map a trait-boundary error to a typed `CurveError`.
///
/// Every device failure is fatal to the cycle; the mapping only decides
/// whether the daemon was unreachable or answered badly.
pub fn map_control_error(e: &(dyn std::error::Error + 'static)) -> CurveError {
    #[cfg(feature = "protocol-errors")]
    {
        if let Some(pe) = e.downcast_ref::<battcurve_protocol::ProtocolError>() {
            return if pe.is_connection() {
                CurveError::Connection(pe.to_string())
            } else {
                CurveError::Protocol(pe.to_string())
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("connect") || lower.contains("refused") || lower.contains("resolve") {
        CurveError::Connection(s)
    } else {
        CurveError::Protocol(s)
    }
}
