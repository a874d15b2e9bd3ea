//! Rounding and integrality helpers with explicit tolerances.

/// Distance from `val` to its nearest integer.
pub fn fractionality(val: f64) -> f64 {
    (val - val.round()).abs()
}

/// Check if `val` lies within `tol` of an integer.
pub fn is_integral(val: f64, tol: f64) -> bool {
    fractionality(val) <= tol
}

/// Round `val` to the nearest integer when it is within `tol` of it.
///
/// Tableau entries such as `2.9999999999` must floor to 3, not 2.
pub fn snap(val: f64, tol: f64) -> f64 {
    let r = val.round();
    if (val - r).abs() <= tol {
        r
    } else {
        val
    }
}

/// Fractional part `val - floor(val)` in [0, 1), after snapping.
pub fn frac_part(val: f64, tol: f64) -> f64 {
    let v = snap(val, tol);
    v - v.floor()
}

/// `floor` after snapping near-integers.
pub fn snapped_floor(val: f64, tol: f64) -> f64 {
    snap(val, tol).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractionality() {
        assert!((fractionality(0.5) - 0.5).abs() < 1e-12);
        assert!((fractionality(2.3) - 0.3).abs() < 1e-12);
        assert!((fractionality(2.7) - 0.3).abs() < 1e-12);
        assert!((fractionality(-1.25) - 0.25).abs() < 1e-12);
        assert!(fractionality(4.0) < 1e-12);
    }

    #[test]
    fn test_is_integral() {
        assert!(is_integral(3.0005, 0.001));
        assert!(!is_integral(3.002, 0.001));
        assert!(is_integral(-0.0000001, 1e-6));
    }

    #[test]
    fn test_snapped_floor_and_frac() {
        assert_eq!(snapped_floor(2.9999999999, 1e-9), 3.0);
        assert_eq!(snapped_floor(-1e-12, 1e-9), 0.0);
        assert_eq!(snapped_floor(-0.25, 1e-9), -1.0);
        assert!((frac_part(-0.25, 1e-9) - 0.75).abs() < 1e-12);
        assert!((frac_part(3.5, 1e-9) - 0.5).abs() < 1e-12);
        assert_eq!(frac_part(1.0 - 1e-12, 1e-9), 0.0);
    }
}
