//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use ms_core::numeric::ensure_finite;
use ms_mission::{Conditions, MissionError, MissionResult, paths};
use ms_solver::Registry;
use nalgebra::DVector;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Reject zero, negative and non-finite parameters.
pub fn require_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidArg { what })
    }
}

pub fn require_non_negative(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidArg { what })
    }
}

/// Copy a time-varying unknown into its conditions entry.
pub fn copy_unknown(
    unknowns: &Registry,
    name: &str,
    conditions: &mut Conditions,
    path: &str,
) -> MissionResult<()> {
    let values = unknowns.require(name)?;
    conditions.set_scalar(path, &DVector::from_column_slice(values))
}

/// Freestream density at every control point, written by an atmosphere
/// that runs ahead of the reading component.
pub fn freestream_density(
    conditions: &Conditions,
    kind: &str,
    tag: &str,
) -> MissionResult<DVector<f64>> {
    if !conditions.contains(paths::DENSITY) {
        return Err(MissionError::configuration(format!(
            "{kind} '{tag}' needs the freestream density; add an atmosphere contributor ahead of it"
        )));
    }
    let rho = conditions.scalar(paths::DENSITY)?;
    if rho.iter().any(|r| r.is_nan() || *r <= 0.0) {
        return Err(MissionError::configuration(format!(
            "{kind} '{tag}' read a non-positive freestream density; the atmosphere must run before it"
        )));
    }
    Ok(rho)
}

/// Sum the scalar `field` of every tagged contributor.
pub fn sum_fields(
    conditions: &Conditions,
    tags: &[String],
    field: &str,
) -> MissionResult<DVector<f64>> {
    let mut total = DVector::zeros(conditions.n_points());
    for tag in tags {
        total += conditions.scalar(&paths::energy(tag, field))?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive(2.0, "x").unwrap(), 2.0);
        assert!(require_positive(0.0, "x").is_err());
        assert!(require_positive(f64::NAN, "x").is_err());
        assert!(require_non_negative(0.0, "x").is_ok());
        assert!(require_non_negative(-1.0, "x").is_err());
    }

    #[test]
    fn fields_are_summed_per_point() {
        let mut c = Conditions::new(3);
        for (tag, value) in [("a", 1.0), ("b", 2.5)] {
            let path = paths::energy(tag, "power");
            c.declare(&path, 1).unwrap();
            c.fill_column(&path, 0, value).unwrap();
        }
        let tags = vec!["a".to_string(), "b".to_string()];
        let total = sum_fields(&c, &tags, "power").unwrap();
        assert_eq!(total.as_slice(), &[3.5, 3.5, 3.5]);
        assert!(sum_fields(&c, &["c".to_string()], "power").is_err());
    }
}
