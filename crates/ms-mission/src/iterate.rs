//! One full residual evaluation of a segment.

use crate::conditions::Conditions;
use crate::contributor::Contributor;
use crate::error::{MissionError, MissionResult};
use crate::kinematics::{update_acceleration, update_forces, update_kinematics, update_weights};
use crate::motion;
use crate::profile::Motion;
use ms_solver::{Discretization, Registry};
use nalgebra::DVector;

/// Everything an iteration reads or writes.
///
/// Cloning a state gives an independent snapshot, which is how Jacobian
/// columns are evaluated in parallel.
#[derive(Clone, Debug)]
pub struct SegmentState {
    pub conditions: Conditions,
    pub unknowns: Registry,
    pub residuals: Registry,
    /// Operators on `[0, 1]`
    pub dimensionless: Discretization,
    /// Operators rescaled to the segment duration
    pub time: Discretization,
    /// Conditions entries summed into the vehicle mass rate
    pub mass_flow_paths: Vec<String>,
    /// Conditions entries summed into the total force
    pub force_paths: Vec<String>,
    pub motion: Motion,
}

/// Map a flat unknowns vector to the flat residuals vector.
///
/// The order is fixed: unpack, then the segment's own unknowns (clock and
/// velocity of an accelerating segment), then per contributor
/// `consume_unknowns` and `compute`, then the forces, weights and
/// kinematics update, then the segment's residuals and per contributor
/// `append_residuals`, then pack. Conditions are updated in place.
///
/// # Errors
/// Any non-finite residual is a `NumericalDomain` error naming its entry.
pub fn iterate(
    contributors: &[Box<dyn Contributor>],
    state: &mut SegmentState,
    x: &DVector<f64>,
) -> MissionResult<DVector<f64>> {
    state.unknowns.unpack(x.as_slice())?;
    motion::consume_unknowns(state)?;

    for contributor in contributors {
        contributor.consume_unknowns(&state.unknowns, &mut state.conditions)?;
        contributor.compute(&mut state.conditions)?;
    }

    update_forces(&mut state.conditions, &state.force_paths)?;
    update_weights(&state.time, &mut state.conditions, &state.mass_flow_paths)?;
    update_kinematics(&state.time, &mut state.conditions)?;
    if !matches!(state.motion, Motion::Accelerating { .. }) {
        update_acceleration(&state.time, &mut state.conditions)?;
    }

    motion::append_residuals(&state.motion, &state.conditions, &mut state.residuals)?;
    for contributor in contributors {
        contributor.append_residuals(&state.conditions, &mut state.residuals)?;
    }

    if let Some(name) = state.residuals.first_non_finite() {
        return Err(MissionError::NumericalDomain {
            what: format!("residual '{name}' is not finite"),
        });
    }
    Ok(state.residuals.pack())
}
