//! Derivative-free root finders.
//!
//! [`QuasiNewton`] is the default segment solver: a Newton iteration on a
//! finite-difference Jacobian, with Broyden rank-one updates between
//! Jacobian refreshes and a backtracking line search on the residual norm.
//! With Broyden updates disabled it is a plain finite-difference Newton
//! method.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::{Differencing, finite_difference_jacobian};
use crate::system::ResidualSystem;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Limits shared by every root finder.
#[derive(Clone, Debug, PartialEq)]
pub struct RootSettings {
    /// Convergence threshold on the Euclidean residual norm
    pub tolerance: f64,
    /// Function evaluation budget; `0` selects `200 * (n + 1)`
    pub max_evaluations: usize,
    /// Relative precision of the residuals used for finite differences;
    /// `None` selects machine epsilon
    pub step_size: Option<f64>,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_evaluations: 0,
            step_size: None,
        }
    }
}

impl RootSettings {
    /// Evaluation budget for a system with `n` unknowns.
    pub fn evaluation_limit(&self, n: usize) -> usize {
        if self.max_evaluations == 0 {
            200 * (n + 1)
        } else {
            self.max_evaluations
        }
    }

    fn validate(&self) -> SolverResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SolverError::Configuration {
                what: format!("tolerance_solution must be positive, got {}", self.tolerance),
            });
        }
        if let Some(step) = self.step_size {
            if !step.is_finite() || step < 0.0 {
                return Err(SolverError::Configuration {
                    what: format!("step_size must be non-negative, got {step}"),
                });
            }
        }
        Ok(())
    }
}

/// Successful root-finding result.
#[derive(Clone, Debug)]
pub struct RootReport {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of accepted steps
    pub iterations: usize,
    /// Number of residual evaluations, Jacobian columns included
    pub evaluations: usize,
}

/// A pluggable nonlinear solver.
///
/// Non-convergence is reported as [`SolverError::ConvergenceFailed`];
/// non-finite residuals as [`SolverError::NumericalDomain`].
pub trait RootFinder {
    fn name(&self) -> &str;

    fn solve(
        &self,
        system: &mut dyn ResidualSystem,
        x0: DVector<f64>,
        settings: &RootSettings,
    ) -> SolverResult<RootReport>;
}

/// Finite-difference quasi-Newton solver.
#[derive(Clone, Debug)]
pub struct QuasiNewton {
    /// Update the Jacobian with Broyden's rank-one formula after each step
    /// instead of recomputing it
    pub broyden_updates: bool,
    /// Finite difference scheme for Jacobian refreshes
    pub differencing: Differencing,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search backtracks per step
    pub max_line_search_iters: usize,
}

impl Default for QuasiNewton {
    fn default() -> Self {
        Self {
            broyden_updates: true,
            differencing: Differencing::Forward,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

impl QuasiNewton {
    /// Plain Newton: the Jacobian is recomputed on every iteration.
    pub fn newton() -> Self {
        Self {
            broyden_updates: false,
            ..Self::default()
        }
    }
}

/// Counts evaluations against the budget and rejects non-finite residuals.
struct Budget<'a> {
    system: &'a mut dyn ResidualSystem,
    used: usize,
    limit: usize,
}

impl Budget<'_> {
    fn charge(&mut self, count: usize) -> SolverResult<()> {
        if self.used + count > self.limit {
            return Err(SolverError::ConvergenceFailed {
                what: format!(
                    "maximum function evaluations ({}) reached after {} calls",
                    self.limit, self.used
                ),
            });
        }
        self.used += count;
        Ok(())
    }
}

fn ensure_finite_residual(r: &DVector<f64>) -> SolverResult<()> {
    if let Some(i) = ms_core::first_non_finite(r.as_slice()) {
        return Err(SolverError::NumericalDomain {
            what: format!("residual component {} is {}", i, r[i]),
        });
    }
    Ok(())
}

impl ResidualSystem for Budget<'_> {
    fn evaluate(&mut self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        self.charge(1)?;
        let r = self.system.evaluate(x)?;
        ensure_finite_residual(&r)?;
        Ok(r)
    }

    fn evaluate_batch(&mut self, xs: &[DVector<f64>]) -> SolverResult<Vec<DVector<f64>>> {
        self.charge(xs.len())?;
        let rs = self.system.evaluate_batch(xs)?;
        for r in &rs {
            ensure_finite_residual(r)?;
        }
        Ok(rs)
    }
}

impl RootFinder for QuasiNewton {
    fn name(&self) -> &str {
        if self.broyden_updates {
            "quasi-newton"
        } else {
            "newton"
        }
    }

    fn solve(
        &self,
        system: &mut dyn ResidualSystem,
        x0: DVector<f64>,
        settings: &RootSettings,
    ) -> SolverResult<RootReport> {
        settings.validate()?;
        let n = x0.len();
        let step_size = settings.step_size.unwrap_or(f64::EPSILON);
        let mut budget = Budget {
            system,
            used: 0,
            limit: settings.evaluation_limit(n),
        };

        let mut x = x0;
        let mut r = budget.evaluate(&x)?;
        if r.len() != n {
            return Err(SolverError::Configuration {
                what: format!("system is not square: {} unknowns, {} residuals", n, r.len()),
            });
        }
        let mut r_norm = r.norm();
        let mut jac: Option<DMatrix<f64>> = None;
        let mut iterations = 0;

        loop {
            debug!(
                solver = self.name(),
                iteration = iterations,
                residual_norm = r_norm,
                evaluations = budget.used,
                "root finder iteration"
            );

            if r_norm <= settings.tolerance {
                return Ok(RootReport {
                    x,
                    residual_norm: r_norm,
                    iterations,
                    evaluations: budget.used,
                });
            }

            let (j, fresh) = match jac.take() {
                Some(j) => (j, false),
                None => (
                    finite_difference_jacobian(&mut budget, &x, &r, step_size, self.differencing)?,
                    true,
                ),
            };

            // Solve J * dx = -r
            let Some(dx) = j.clone().lu().solve(&(-&r)) else {
                if fresh {
                    return Err(SolverError::ConvergenceFailed {
                        what: format!(
                            "Jacobian is singular at iteration {iterations}, residual = {r_norm:e}"
                        ),
                    });
                }
                continue;
            };

            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..=self.max_line_search_iters {
                let x_new = &x + &dx * alpha;
                let r_new = budget.evaluate(&x_new)?;
                let new_norm = r_new.norm();
                if new_norm < r_norm {
                    accepted = Some((x_new, r_new, new_norm));
                    break;
                }
                alpha *= self.line_search_beta;
            }

            let Some((x_new, r_new, new_norm)) = accepted else {
                if fresh {
                    return Err(SolverError::ConvergenceFailed {
                        what: format!(
                            "line search stagnated at iteration {iterations}, residual = {r_norm:e}"
                        ),
                    });
                }
                // Stale Broyden Jacobian: refresh it at the current point.
                continue;
            };
            iterations += 1;

            if self.broyden_updates {
                let s = &x_new - &x;
                let y = &r_new - &r;
                let ss = s.dot(&s);
                let mut j = j;
                if ss > 0.0 {
                    let correction = (&y - &j * &s) * s.transpose() / ss;
                    j += correction;
                }
                jac = Some(j);
            }

            x = x_new;
            r = r_new;
            r_norm = new_norm;
        }
    }
}
