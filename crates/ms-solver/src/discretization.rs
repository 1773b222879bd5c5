//! Pseudo-spectral time discretization operators.
//!
//! Control points are Chebyshev–Gauss–Lobatto points mapped onto `[0, 1]`:
//!
//! ```text
//! x_i = (1 - cos(π i / (N - 1))) / 2,    i = 0..N-1
//! ```
//!
//! The differentiation matrix uses the negative-sum trick on its diagonal so
//! that every row sums to zero (the derivative of a constant is exactly zero).
//! The integration matrix is the inverse of the differentiation matrix with
//! the first row and column removed, padded back with zeros. Together they
//! satisfy `I · (D · f) = f - f(0)`.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// Control points plus differentiation and integration operators.
///
/// The dimensionless operators live on `[0, 1]`; [`Discretization::rescale`]
/// produces the operators for a segment of real duration `T`.
#[derive(Clone, Debug, PartialEq)]
pub struct Discretization {
    /// Sample locations (dimensionless on `[0, 1]`, seconds after rescaling)
    pub control_points: DVector<f64>,
    /// Differentiation operator `D`
    pub differentiate: DMatrix<f64>,
    /// Integration operator `I` (first row is zero)
    pub integrate: DMatrix<f64>,
}

impl Discretization {
    /// Build the Chebyshev operators for `n_points` control points.
    ///
    /// # Errors
    /// Returns `Configuration` when `n_points < 2`, and `NumericalDomain` if
    /// the reduced differentiation matrix cannot be inverted.
    pub fn chebyshev(n_points: usize) -> SolverResult<Self> {
        if n_points < 2 {
            return Err(SolverError::Configuration {
                what: format!("number_of_control_points must be at least 2, got {n_points}"),
            });
        }

        let n = n_points;
        let last = (n - 1) as f64;
        let x = DVector::from_fn(n, |i, _| 0.5 * (1.0 - (PI * i as f64 / last).cos()));

        let c: Vec<f64> = (0..n)
            .map(|i| {
                let weight = if i == 0 || i == n - 1 { 2.0 } else { 1.0 };
                if i % 2 == 0 { weight } else { -weight }
            })
            .collect();

        let mut d = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                0.0
            } else {
                c[i] / (c[j] * (x[i] - x[j]))
            }
        });
        for i in 0..n {
            let off_diagonal: f64 = d.row(i).iter().sum();
            d[(i, i)] = -off_diagonal;
        }

        let reduced = d.view((1, 1), (n - 1, n - 1)).clone_owned();
        let inverse = reduced
            .try_inverse()
            .ok_or_else(|| SolverError::NumericalDomain {
                what: format!("differentiation operator for {n} points is singular"),
            })?;
        let mut integ = DMatrix::zeros(n, n);
        integ.view_mut((1, 1), (n - 1, n - 1)).copy_from(&inverse);

        Ok(Self {
            control_points: x,
            differentiate: d,
            integrate: integ,
        })
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.control_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.control_points.is_empty()
    }

    /// Rescale the operators to a time span of `duration`.
    ///
    /// Returns `(x·T, D/T, I·T)`. Rescaling by `1.0` leaves the operators
    /// bit-for-bit unchanged.
    ///
    /// # Errors
    /// Returns `NumericalDomain` for a zero, negative or non-finite duration.
    pub fn rescale(&self, duration: f64) -> SolverResult<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SolverError::NumericalDomain {
                what: format!("cannot rescale operators to duration {duration}"),
            });
        }

        Ok(Self {
            control_points: self.control_points.map(|v| v * duration),
            differentiate: self.differentiate.map(|v| v / duration),
            integrate: self.integrate.map(|v| v * duration),
        })
    }

    /// Apply the differentiation operator to a sampled function.
    pub fn derivative(&self, f: &DVector<f64>) -> DVector<f64> {
        &self.differentiate * f
    }

    /// Apply the integration operator to a sampled function.
    ///
    /// Row `i` is the integral from the first control point to point `i`.
    pub fn integral(&self, f: &DVector<f64>) -> DVector<f64> {
        &self.integrate * f
    }
}
