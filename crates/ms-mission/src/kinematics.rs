//! Integration of accumulated quantities over a segment.
//!
//! Velocity is prescribed by the profile or integrated from the solved
//! acceleration; position, range and vehicle mass are integrated with the
//! time-rescaled operators from their first-control-point values, which
//! continuity has already seeded.

use crate::conditions::{Conditions, paths};
use crate::error::{MissionError, MissionResult};
use ms_solver::Discretization;
use nalgebra::{DMatrix, DVector};

/// Update position, altitude and range from velocity.
pub fn update_kinematics(ops: &Discretization, conditions: &mut Conditions) -> MissionResult<()> {
    let n = conditions.n_points();
    let mut velocity = Vec::with_capacity(3);

    for axis in 0..3 {
        let v = conditions.column(paths::VELOCITY, axis)?;
        let p0 = conditions.entry(paths::POSITION)?[(0, axis)];

        conditions.set_column(paths::POSITION, axis, &ops.integral(&v).add_scalar(p0))?;
        velocity.push(v);
    }

    let z = conditions.column(paths::POSITION, 2)?;
    conditions.set_scalar(paths::ALTITUDE, &(-z))?;

    let ground_speed = DVector::from_fn(n, |i, _| velocity[0][i].hypot(velocity[1][i]));
    let r0 = conditions.entry(paths::RANGE)?[(0, 0)];
    conditions.set_scalar(paths::RANGE, &ops.integral(&ground_speed).add_scalar(r0))?;
    Ok(())
}

/// Differentiate a prescribed velocity history into acceleration.
pub fn update_acceleration(ops: &Discretization, conditions: &mut Conditions) -> MissionResult<()> {
    for axis in 0..3 {
        let v = conditions.column(paths::VELOCITY, axis)?;
        conditions.set_column(paths::ACCELERATION, axis, &ops.derivative(&v))?;
    }
    Ok(())
}

/// Sum the contributors' force vectors into the total force.
pub fn update_forces(conditions: &mut Conditions, force_paths: &[String]) -> MissionResult<()> {
    let mut total = DMatrix::zeros(conditions.n_points(), 3);
    for path in force_paths {
        let force = conditions.entry(path)?;
        if force.ncols() != 3 {
            return Err(MissionError::configuration(format!(
                "force '{path}' has {} columns, expected 3",
                force.ncols()
            )));
        }
        total += force;
    }
    *conditions.entry_mut(paths::TOTAL_FORCE)? = total;
    Ok(())
}

/// Sum the contributors' mass flows, integrate vehicle mass and update the
/// gravity force.
///
/// `total_mass = m0 - I * mdot`, where `m0` is the seeded first sample.
pub fn update_weights(
    ops: &Discretization,
    conditions: &mut Conditions,
    mass_flow_paths: &[String],
) -> MissionResult<()> {
    let mut mass_rate = DVector::zeros(conditions.n_points());
    for path in mass_flow_paths {
        mass_rate += conditions.scalar(path)?;
    }
    conditions.set_scalar(paths::MASS_RATE, &mass_rate)?;

    let m0 = conditions.entry(paths::TOTAL_MASS)?[(0, 0)];
    let mass = ops.integral(&mass_rate).map(|burned| m0 - burned);
    conditions.set_scalar(paths::TOTAL_MASS, &mass)?;

    let gravity = conditions.scalar(paths::GRAVITY)?;
    conditions.set_column(paths::GRAVITY_FORCE, 2, &mass.component_mul(&gravity))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(n: usize) -> Conditions {
        let mut c = Conditions::new(n);
        for path in [
            paths::POSITION,
            paths::VELOCITY,
            paths::ACCELERATION,
            paths::GRAVITY_FORCE,
            paths::TOTAL_FORCE,
        ] {
            c.declare(path, 3).unwrap();
        }
        for path in [
            paths::RANGE,
            paths::ALTITUDE,
            paths::TOTAL_MASS,
            paths::MASS_RATE,
            paths::GRAVITY,
        ] {
            c.declare(path, 1).unwrap();
        }
        c
    }

    #[test]
    fn level_flight_covers_speed_times_duration() {
        let n = 8;
        let ops = Discretization::chebyshev(n).unwrap().rescale(100.0).unwrap();
        let mut c = conditions(n);
        c.fill_column(paths::VELOCITY, 0, 50.0).unwrap();
        c.set_initial(paths::POSITION, &[1_000.0, 0.0, -400.0]).unwrap();
        c.set_initial(paths::RANGE, &[1_000.0]).unwrap();

        update_kinematics(&ops, &mut c).unwrap();
        update_acceleration(&ops, &mut c).unwrap();

        let x = c.column(paths::POSITION, 0).unwrap();
        assert!((x[n - 1] - 6_000.0).abs() < 1e-8);
        let range = c.scalar(paths::RANGE).unwrap();
        assert!((range[n - 1] - 6_000.0).abs() < 1e-8);
        let altitude = c.scalar(paths::ALTITUDE).unwrap();
        assert!(altitude.iter().all(|h| (h - 400.0).abs() < 1e-9));
        assert!(c.entry(paths::ACCELERATION).unwrap().amax() < 1e-8);
    }

    #[test]
    fn climb_raises_altitude() {
        let n = 6;
        let ops = Discretization::chebyshev(n).unwrap().rescale(60.0).unwrap();
        let mut c = conditions(n);
        c.fill_column(paths::VELOCITY, 0, 40.0).unwrap();
        c.fill_column(paths::VELOCITY, 2, -5.0).unwrap();

        update_kinematics(&ops, &mut c).unwrap();

        let altitude = c.scalar(paths::ALTITUDE).unwrap();
        assert_eq!(altitude[0], 0.0);
        assert!((altitude[n - 1] - 300.0).abs() < 1e-8);
    }

    #[test]
    fn accelerating_velocity_differentiates_to_constant() {
        let n = 7;
        let ops = Discretization::chebyshev(n).unwrap().rescale(20.0).unwrap();
        let mut c = conditions(n);
        let t = ops.control_points.clone();
        c.set_column(paths::VELOCITY, 0, &t.map(|t| 30.0 + 1.5 * t)).unwrap();

        update_acceleration(&ops, &mut c).unwrap();

        let a = c.column(paths::ACCELERATION, 0).unwrap();
        assert!(a.iter().all(|a| (a - 1.5).abs() < 1e-9));
    }

    #[test]
    fn forces_are_summed() {
        let n = 3;
        let mut c = conditions(n);
        for (tag, fx) in [("thrust", 900.0), ("drag", -300.0)] {
            let path = paths::energy(tag, "force");
            c.declare(&path, 3).unwrap();
            c.fill_column(&path, 0, fx).unwrap();
        }
        let forces = vec![paths::energy("thrust", "force"), paths::energy("drag", "force")];

        update_forces(&mut c, &forces).unwrap();

        let total = c.entry(paths::TOTAL_FORCE).unwrap();
        assert!(total.column(0).iter().all(|f| *f == 600.0));
        assert_eq!(total.column(2).amax(), 0.0);
    }

    #[test]
    fn weights_integrate_summed_mass_flows() {
        let n = 10;
        let duration = 250.0;
        let ops = Discretization::chebyshev(n).unwrap().rescale(duration).unwrap();
        let mut c = conditions(n);
        c.fill_column(paths::TOTAL_MASS, 0, 2_000.0).unwrap();
        c.fill_column(paths::GRAVITY, 0, 9.81).unwrap();
        for tag in ["left", "right"] {
            let path = paths::energy(tag, "mass_flow");
            c.declare(&path, 1).unwrap();
            c.fill_column(&path, 0, 0.01).unwrap();
        }
        let flows = vec![
            paths::energy("left", "mass_flow"),
            paths::energy("right", "mass_flow"),
        ];

        update_weights(&ops, &mut c, &flows).unwrap();

        let mass = c.scalar(paths::TOTAL_MASS).unwrap();
        assert_eq!(mass[0], 2_000.0);
        assert!((mass[n - 1] - (2_000.0 - 0.02 * duration)).abs() < 1e-8);
        let weight = c.column(paths::GRAVITY_FORCE, 2).unwrap();
        assert!((weight[n - 1] - mass[n - 1] * 9.81).abs() < 1e-9);
    }
}
