//! Contract between a segment and the physical subsystems solved in it.

use crate::conditions::Conditions;
use crate::error::MissionResult;
use ms_solver::Registry;

/// A physical subsystem taking part in a segment solve.
///
/// Every method takes `&self`: a contributor's mutable state lives in its
/// subtree of [`Conditions`] (`energy.<tag>.*`) and in the registry entries
/// it declared, so a segment can snapshot its whole state for parallel
/// Jacobian columns.
///
/// Per iteration the segment calls, in contributor declaration order,
/// [`consume_unknowns`](Contributor::consume_unknowns) then
/// [`compute`](Contributor::compute); after the kinematics and weights
/// update it calls [`append_residuals`](Contributor::append_residuals).
///
/// Trial vectors may be far from physical (negative speeds, zero currents).
/// Implementations must produce finite numbers or a typed error for them,
/// never panic.
pub trait Contributor: Send + Sync {
    /// Unique name within a segment; also the root of the conditions subtree.
    fn tag(&self) -> &str;

    /// Declare the conditions entries this contributor reads or writes.
    fn append_conditions(&self, _conditions: &mut Conditions) -> MissionResult<()> {
        Ok(())
    }

    /// Declare unknowns with their initial guess, `n_points` values each for
    /// time-varying unknowns.
    fn append_unknowns(&self, _n_points: usize, _unknowns: &mut Registry) -> MissionResult<()> {
        Ok(())
    }

    /// Copy the current guess into the contributor's conditions subtree.
    fn consume_unknowns(
        &self,
        _unknowns: &Registry,
        _conditions: &mut Conditions,
    ) -> MissionResult<()> {
        Ok(())
    }

    /// Evaluate the subsystem physics.
    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()>;

    /// Declare or overwrite residual entries, scaled to order unity.
    fn append_residuals(
        &self,
        _conditions: &Conditions,
        _residuals: &mut Registry,
    ) -> MissionResult<()> {
        Ok(())
    }

    /// Conditions entry holding a mass flow leaving the vehicle (kg/s),
    /// summed into `weights.vehicle_mass_rate`.
    fn mass_flow_path(&self) -> Option<String> {
        None
    }

    /// Conditions entry holding a three-column force on the vehicle (N),
    /// summed into `frames.inertial.total_force_vector`.
    fn force_path(&self) -> Option<String> {
        None
    }
}
