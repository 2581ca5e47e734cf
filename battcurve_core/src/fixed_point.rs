//! Fixed-point centivolt helpers.
//!
//! Table voltages live in centivolts (`i32`, 1 cV = 0.01 V). Rounding once at
//! the boundary makes "same rounded voltage" an exact integer comparison.

/// Quantize volts to centivolts, rounding half to even and clamping to the
/// `i32` range. Non-finite values (NaN/±Inf) map to 0.
#[inline]
pub fn volts_to_cv(v: f64) -> i32 {
    if !v.is_finite() {
        return 0;
    }
    let scaled = (v * 100.0).round_ties_even();
    if scaled >= f64::from(i32::MAX) {
        i32::MAX
    } else if scaled <= f64::from(i32::MIN) {
        i32::MIN
    } else {
        scaled as i32
    }
}

#[inline]
pub fn cv_to_volts(cv: i32) -> f64 {
    f64::from(cv) / 100.0
}

/// Round a percentage to an integer SOC (half to even), clamped to 0..=100.
#[inline]
pub fn round_soc(pct: f64) -> u8 {
    if !pct.is_finite() {
        return 0;
    }
    pct.round_ties_even().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(4.19, 419)]
    #[case(3.1, 310)]
    #[case(3.104, 310)]
    #[case(3.106, 311)]
    #[case(0.0, 0)]
    #[case(f64::NAN, 0)]
    #[case(f64::INFINITY, 0)]
    fn quantizes_volts(#[case] v: f64, #[case] cv: i32) {
        assert_eq!(volts_to_cv(v), cv);
    }

    #[test]
    fn centivolts_render_as_two_decimals() {
        assert_eq!(cv_to_volts(419), 4.19);
        assert_eq!(cv_to_volts(310), 3.1);
    }

    #[rstest]
    #[case(66.666, 67)]
    #[case(33.333, 33)]
    #[case(62.5, 62)]
    #[case(87.5, 88)]
    #[case(-3.0, 0)]
    #[case(140.0, 100)]
    #[case(f64::NAN, 0)]
    fn rounds_soc_half_to_even(#[case] pct: f64, #[case] soc: u8) {
        assert_eq!(round_soc(pct), soc);
    }
}
