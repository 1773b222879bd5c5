//! The residual function seen by a root finder.

use crate::error::SolverResult;
use nalgebra::DVector;
use rayon::prelude::*;

/// A square nonlinear system `F(x) = 0`.
///
/// Evaluation takes `&mut self`: implementations are allowed to mutate their
/// own state on every call (a segment updates its conditions in place).
/// Callers must not assume referential transparency.
pub trait ResidualSystem {
    /// Evaluate the residual vector at `x`.
    fn evaluate(&mut self, x: &DVector<f64>) -> SolverResult<DVector<f64>>;

    /// Evaluate several independent trial points, as needed by a
    /// finite-difference Jacobian.
    ///
    /// The default evaluates sequentially. Implementations that can evaluate
    /// trial points on independent snapshots may override this to run them in
    /// parallel.
    fn evaluate_batch(&mut self, xs: &[DVector<f64>]) -> SolverResult<Vec<DVector<f64>>> {
        xs.iter().map(|x| self.evaluate(x)).collect()
    }
}

/// Adapter turning a plain closure into a [`ResidualSystem`].
pub struct FnSystem<F>(pub F);

impl<F> ResidualSystem for FnSystem<F>
where
    F: FnMut(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    fn evaluate(&mut self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        (self.0)(x)
    }
}

/// Closure-backed system whose trial batches run on the rayon thread pool.
///
/// The closure must be pure (`Fn + Sync`): every point of a batch is
/// evaluated independently.
pub struct ParallelFnSystem<F>(pub F);

impl<F> ResidualSystem for ParallelFnSystem<F>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>> + Sync,
{
    fn evaluate(&mut self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        (self.0)(x)
    }

    fn evaluate_batch(&mut self, xs: &[DVector<f64>]) -> SolverResult<Vec<DVector<f64>>> {
        let f = &self.0;
        xs.par_iter().map(|x| f(x)).collect()
    }
}
