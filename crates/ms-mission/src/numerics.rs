//! Solver configuration of a segment.

use ms_solver::RootSettings;

#[derive(Clone, Debug, PartialEq)]
pub struct Numerics {
    pub number_of_control_points: usize,
    /// Residual-norm convergence threshold
    pub tolerance_solution: f64,
    /// Evaluation budget; `0` selects `200 * (n + 1)`
    pub max_evaluations: usize,
    /// Finite-difference step; `None` selects machine epsilon
    pub step_size: Option<f64>,
    /// Evaluate Jacobian columns in parallel on snapshots of the segment state
    pub parallel_jacobian: bool,
}

impl Default for Numerics {
    fn default() -> Self {
        Self {
            number_of_control_points: 16,
            tolerance_solution: 1e-8,
            max_evaluations: 0,
            step_size: None,
            parallel_jacobian: false,
        }
    }
}

impl Numerics {
    pub fn root_settings(&self) -> RootSettings {
        RootSettings {
            tolerance: self.tolerance_solution,
            max_evaluations: self.max_evaluations,
            step_size: self.step_size,
        }
    }
}
