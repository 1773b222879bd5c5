//! Numerical machinery for segment solves.
//!
//! This crate provides the pieces of a segment solve that know nothing about
//! vehicles: pseudo-spectral time discretization operators, the named
//! unknowns/residuals registry that flattens to and from a solver vector, and
//! derivative-free root finders driven through the [`ResidualSystem`] trait.

pub mod discretization;
pub mod error;
pub mod jacobian;
pub mod newton;
pub mod registry;
pub mod system;

pub use discretization::Discretization;
pub use error::{SolverError, SolverResult};
pub use jacobian::Differencing;
pub use newton::{QuasiNewton, RootFinder, RootReport, RootSettings};
pub use registry::Registry;
pub use system::{FnSystem, ParallelFnSystem, ResidualSystem};
