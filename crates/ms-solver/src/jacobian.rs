//! Finite difference Jacobian computation.

use crate::error::{SolverError, SolverResult};
use crate::system::ResidualSystem;
use nalgebra::{DMatrix, DVector};

/// Finite difference scheme used to approximate the Jacobian.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Differencing {
    /// One extra evaluation per unknown.
    #[default]
    Forward,
    /// Two extra evaluations per unknown, second-order accurate.
    Central,
}

/// Perturbation applied to unknown `x_j`.
///
/// `step_size` is the relative precision of the residual function (MINPACK's
/// `epsfcn`); the perturbation is `sqrt(step_size) * max(|x_j|, 1)`.
pub fn perturbation(x_j: f64, step_size: f64) -> f64 {
    step_size.max(f64::EPSILON).sqrt() * x_j.abs().max(1.0)
}

/// Approximate the Jacobian of `system` at `x`.
///
/// `fx` must be the residual already evaluated at `x`; it is reused by the
/// forward scheme. All perturbed points are handed to
/// [`ResidualSystem::evaluate_batch`] at once so that systems able to
/// evaluate them independently can do so in parallel.
pub fn finite_difference_jacobian(
    system: &mut dyn ResidualSystem,
    x: &DVector<f64>,
    fx: &DVector<f64>,
    step_size: f64,
    differencing: Differencing,
) -> SolverResult<DMatrix<f64>> {
    let n = x.len();
    let m = fx.len();
    let steps: Vec<f64> = x.iter().map(|&xj| perturbation(xj, step_size)).collect();

    let mut perturbed = Vec::with_capacity(match differencing {
        Differencing::Forward => n,
        Differencing::Central => 2 * n,
    });
    for (j, &h) in steps.iter().enumerate() {
        let mut plus = x.clone();
        plus[j] += h;
        perturbed.push(plus);
        if differencing == Differencing::Central {
            let mut minus = x.clone();
            minus[j] -= h;
            perturbed.push(minus);
        }
    }

    let values = system.evaluate_batch(&perturbed)?;
    if values.len() != perturbed.len() || values.iter().any(|v| v.len() != m) {
        return Err(SolverError::Evaluation {
            what: "perturbed evaluation returned a residual of the wrong size".to_string(),
        });
    }

    let mut jac = DMatrix::zeros(m, n);
    for (j, &h) in steps.iter().enumerate() {
        let column = match differencing {
            Differencing::Forward => (&values[j] - fx) / h,
            Differencing::Central => (&values[2 * j] - &values[2 * j + 1]) / (2.0 * h),
        };
        jac.set_column(j, &column);
    }

    Ok(jac)
}
