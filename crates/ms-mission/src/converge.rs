//! Root-finding driver: runs a root finder over [`iterate`] and turns
//! non-convergence into an outcome instead of an error.

use crate::contributor::Contributor;
use crate::error::{MissionError, MissionResult};
use crate::iterate::{SegmentState, iterate};
use crate::numerics::Numerics;
use ms_solver::{ResidualSystem, RootFinder, SolverError, SolverResult};
use nalgebra::DVector;
use rayon::prelude::*;
use tracing::{info, warn};

/// Lifecycle of a segment. `Converged` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentStatus {
    #[default]
    Unsolved,
    Converged,
    Failed,
}

/// Result of solving one segment.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentOutcome {
    Converged {
        iterations: usize,
        evaluations: usize,
        residual_norm: f64,
    },
    /// The root finder gave up; `message` is its diagnostic.
    Failed { message: String },
}

impl SegmentOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, SegmentOutcome::Converged { .. })
    }

    pub fn status(&self) -> SegmentStatus {
        match self {
            SegmentOutcome::Converged { .. } => SegmentStatus::Converged,
            SegmentOutcome::Failed { .. } => SegmentStatus::Failed,
        }
    }
}

/// A segment seen as a residual system.
struct SegmentSystem<'a> {
    contributors: &'a [Box<dyn Contributor>],
    state: &'a mut SegmentState,
    parallel: bool,
}

impl ResidualSystem for SegmentSystem<'_> {
    fn evaluate(&mut self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        iterate(self.contributors, self.state, x).map_err(SolverError::from)
    }

    fn evaluate_batch(&mut self, xs: &[DVector<f64>]) -> SolverResult<Vec<DVector<f64>>> {
        if !self.parallel {
            return xs.iter().map(|x| self.evaluate(x)).collect();
        }
        let contributors = self.contributors;
        let snapshot: &SegmentState = &*self.state;
        xs.par_iter()
            .map(|x| {
                let mut trial = snapshot.clone();
                iterate(contributors, &mut trial, x).map_err(SolverError::from)
            })
            .collect()
    }
}

/// Drive the residuals of an initialized segment to zero.
///
/// On success the conditions hold the accepted solution. Non-convergence is
/// logged and returned as [`SegmentOutcome::Failed`]; configuration and
/// numerical-domain problems are errors.
pub fn converge(
    tag: &str,
    contributors: &[Box<dyn Contributor>],
    state: &mut SegmentState,
    numerics: &Numerics,
    root_finder: &dyn RootFinder,
) -> MissionResult<SegmentOutcome> {
    let x0 = state.unknowns.pack();

    if x0.is_empty() {
        let residuals = iterate(contributors, state, &x0)?;
        info!(segment = tag, "segment has no unknowns");
        return Ok(SegmentOutcome::Converged {
            iterations: 0,
            evaluations: 1,
            residual_norm: residuals.norm(),
        });
    }

    let mut system = SegmentSystem {
        contributors,
        state: &mut *state,
        parallel: numerics.parallel_jacobian,
    };

    match root_finder.solve(&mut system, x0, &numerics.root_settings()) {
        Ok(report) => {
            // Jacobian columns may have run after the accepted point.
            if state.unknowns.pack() != report.x {
                iterate(contributors, state, &report.x)?;
            }
            info!(
                segment = tag,
                solver = root_finder.name(),
                iterations = report.iterations,
                evaluations = report.evaluations,
                residual_norm = report.residual_norm,
                "segment converged"
            );
            Ok(SegmentOutcome::Converged {
                iterations: report.iterations,
                evaluations: report.evaluations,
                residual_norm: report.residual_norm,
            })
        }
        Err(SolverError::ConvergenceFailed { what }) => {
            warn!(
                segment = tag,
                solver = root_finder.name(),
                message = %what,
                "segment did not converge"
            );
            Ok(SegmentOutcome::Failed { message: what })
        }
        Err(e) => Err(MissionError::from(e)),
    }
}
