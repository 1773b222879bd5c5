use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Index of the first non-finite value in `values`, if any.
pub fn first_non_finite(values: &[Real]) -> Option<usize> {
    values.iter().position(|v| !v.is_finite())
}

/// Ensure a divisor is usable, rejecting zero, near-zero and non-finite values.
pub fn ensure_divisor(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v.abs() <= Real::EPSILON {
        return Err(CoreError::InvalidArg { what });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn first_non_finite_finds_infinity() {
        assert_eq!(first_non_finite(&[1.0, 2.0, 3.0]), None);
        assert_eq!(first_non_finite(&[1.0, Real::INFINITY, Real::NAN]), Some(1));
    }

    #[test]
    fn ensure_divisor_rejects_zero() {
        assert!(ensure_divisor(0.0, "count").is_err());
        assert!(ensure_divisor(Real::NAN, "count").is_err());
        assert_eq!(ensure_divisor(4.0, "count").unwrap(), 4.0);
    }
}
