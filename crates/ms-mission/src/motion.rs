//! Segment-level unknowns of segments whose speed is solved for.
//!
//! An accelerating segment owns two unknowns: the horizontal acceleration at
//! every control point and the elapsed time. Its residuals are the
//! longitudinal force balance and the miss on the final speed. Changing the
//! elapsed time rescales the time operators, so the segment's clock moves
//! with the guess.

use crate::conditions::{Conditions, paths};
use crate::error::{MissionError, MissionResult};
use crate::iterate::SegmentState;
use crate::profile::Motion;
use ms_solver::Registry;
use nalgebra::DVector;

pub const ACCELERATION: &str = "acceleration";
pub const ELAPSED_TIME: &str = "elapsed_time";
pub const FORCES: &str = "forces";
pub const FINAL_VELOCITY_ERROR: &str = "final_velocity_error";

/// Floor applied to elapsed-time guesses.
const MIN_ELAPSED_TIME: f64 = 1e-6;

/// Declare the segment's own unknowns, ahead of the contributors'.
pub fn append_unknowns(
    motion: &Motion,
    n_points: usize,
    duration: f64,
    speed_start: f64,
    unknowns: &mut Registry,
) -> MissionResult<()> {
    let Motion::Accelerating { speed_end } = motion else {
        return Ok(());
    };
    let guess = (speed_end.value - speed_start) / duration;
    unknowns.declare(ACCELERATION, vec![guess; n_points])?;
    unknowns.declare(ELAPSED_TIME, vec![duration])?;
    Ok(())
}

/// Rescale the clock to the elapsed-time guess and integrate the
/// acceleration guess into velocity.
pub fn consume_unknowns(state: &mut SegmentState) -> MissionResult<()> {
    let Motion::Accelerating { .. } = state.motion else {
        return Ok(());
    };

    let elapsed = state
        .unknowns
        .require(ELAPSED_TIME)?
        .first()
        .copied()
        .unwrap_or(f64::NAN);
    if !elapsed.is_finite() {
        return Err(MissionError::NumericalDomain {
            what: format!("elapsed time guess {elapsed} is not finite"),
        });
    }
    state.time = state.dimensionless.rescale(elapsed.max(MIN_ELAPSED_TIME))?;

    let conditions = &mut state.conditions;
    let t0 = conditions.entry(paths::TIME)?[(0, 0)];
    conditions.set_scalar(paths::TIME, &state.time.control_points.add_scalar(t0))?;

    let a = DVector::from_column_slice(state.unknowns.require(ACCELERATION)?);
    let v0 = conditions.entry(paths::VELOCITY)?[(0, 0)];
    let v = state.time.integral(&a).add_scalar(v0);
    conditions.set_column(paths::VELOCITY, 0, &v)?;
    conditions.set_column(paths::ACCELERATION, 0, &a)?;
    conditions.set_scalar(paths::AIRSPEED, &v.abs())?;
    Ok(())
}

/// Force balance `F_x / m - a_x` at every control point and the final speed
/// error `|v_final| - v_end`.
pub fn append_residuals(
    motion: &Motion,
    conditions: &Conditions,
    residuals: &mut Registry,
) -> MissionResult<()> {
    let Motion::Accelerating { speed_end } = motion else {
        return Ok(());
    };

    let force = conditions.column(paths::TOTAL_FORCE, 0)?;
    let mass = conditions.scalar(paths::TOTAL_MASS)?;
    let a = conditions.column(paths::ACCELERATION, 0)?;
    let balance: Vec<f64> = force
        .iter()
        .zip(mass.iter())
        .zip(a.iter())
        .map(|((f, m), a)| f / m - a)
        .collect();
    residuals.upsert(FORCES, &balance)?;

    let v = conditions.last_row(paths::VELOCITY)?;
    let speed = v.iter().map(|c| c * c).sum::<f64>().sqrt();
    residuals.upsert(FINAL_VELOCITY_ERROR, &[speed - speed_end.value])?;
    Ok(())
}
