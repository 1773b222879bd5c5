//! DC motor driving a fixed-pitch rotor.
//!
//! ## Model
//!
//! The unknown is the shaft speed `ω` at every control point.
//!
//! ```text
//! i       = (throttle · V - ω / kv) / R
//! Q_motor = (i - i0) / kv
//! n       = ω / 2π
//! Q_rotor = cq · ρ · n|n| · D⁵
//! T       = ct · ρ · n|n| · D⁴
//! ```
//!
//! The residual is the torque balance `Q_motor - Q_rotor`. Using `n|n|`
//! instead of `n²` keeps both torques monotonic in `ω`, so guesses at
//! negative speed stay finite and point back towards the root.
//!
//! Density comes from the freestream, so an atmosphere contributor must run
//! ahead of the rotor. Thrust acts along the body x axis and is published as
//! the rotor's force vector.

use crate::common::{
    check_finite, copy_unknown, freestream_density, require_non_negative, require_positive,
};
use crate::error::{ComponentError, ComponentResult};
use ms_core::units::{AngularVelocity, Length, Resistance, Torque, Voltage, nm};
use ms_mission::{Conditions, Contributor, MissionResult, paths};
use ms_solver::Registry;
use std::f64::consts::PI;

/// Defect between driving and driven torque at one control point.
pub fn torque_balance_residual(motor_torque: Torque, rotor_torque: Torque) -> f64 {
    (motor_torque - rotor_torque).value
}

#[derive(Clone, Debug, PartialEq)]
pub struct Motor {
    /// Speed constant (rad/s per volt)
    pub kv: f64,
    pub resistance: Resistance,
    /// No-load current (A)
    pub no_load_current: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rotor {
    pub diameter: Length,
    pub thrust_coefficient: f64,
    pub torque_coefficient: f64,
}

/// An electric propulsor drawing power from a bus.
#[derive(Clone, Debug)]
pub struct ElectricRotor {
    tag: String,
    motor: Motor,
    rotor: Rotor,
    voltage: Voltage,
    throttle: f64,
    initial_speed: AngularVelocity,
}

impl ElectricRotor {
    /// # Errors
    /// Returns `InvalidArg` for non-positive motor constants, rotor
    /// coefficients or voltage, and for a throttle outside `[0, 1]`.
    pub fn new(
        tag: impl Into<String>,
        motor: Motor,
        rotor: Rotor,
        voltage: Voltage,
        throttle: f64,
        initial_speed: AngularVelocity,
    ) -> ComponentResult<Self> {
        require_positive(motor.kv, "motor kv must be positive")?;
        require_positive(motor.resistance.value, "motor resistance must be positive")?;
        require_non_negative(motor.no_load_current, "no-load current cannot be negative")?;
        require_positive(rotor.diameter.value, "rotor diameter must be positive")?;
        require_positive(rotor.thrust_coefficient, "thrust coefficient must be positive")?;
        require_positive(rotor.torque_coefficient, "torque coefficient must be positive")?;
        require_positive(voltage.value, "bus voltage must be positive")?;
        if !(0.0..=1.0).contains(&throttle) {
            return Err(ComponentError::InvalidArg {
                what: "throttle must be in [0, 1]",
            });
        }
        Ok(Self {
            tag: tag.into(),
            motor,
            rotor,
            voltage,
            throttle,
            initial_speed,
        })
    }

    fn unknown(&self) -> String {
        format!("{}_rotor_speed", self.tag)
    }

    fn residual(&self) -> String {
        format!("{}_motor_torque", self.tag)
    }

    fn path(&self, field: &str) -> String {
        paths::energy(&self.tag, field)
    }
}

impl Contributor for ElectricRotor {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        for field in [
            "rotor_speed",
            "current",
            "power",
            "motor_torque",
            "rotor_torque",
            "thrust",
            "heat",
        ] {
            conditions.declare(&self.path(field), 1)?;
        }
        conditions.declare(&self.path("force"), 3)
    }

    fn append_unknowns(&self, n_points: usize, unknowns: &mut Registry) -> MissionResult<()> {
        unknowns.declare(self.unknown(), vec![self.initial_speed.value; n_points])?;
        Ok(())
    }

    fn consume_unknowns(&self, unknowns: &Registry, conditions: &mut Conditions) -> MissionResult<()> {
        copy_unknown(unknowns, &self.unknown(), conditions, &self.path("rotor_speed"))
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        let omega = conditions.scalar(&self.path("rotor_speed"))?;
        let rho = freestream_density(conditions, "rotor", &self.tag)?;

        let v = self.throttle * self.voltage.value;
        let r = self.motor.resistance.value;
        let kv = self.motor.kv;
        let d = self.rotor.diameter.value;

        let current = omega.map(|w| (v - w / kv) / r);
        let motor_torque = current.map(|i| (i - self.motor.no_load_current) / kv);
        let n_abs_n = omega.map(|w| {
            let n = w / (2.0 * PI);
            n * n.abs()
        });
        let rotor_torque = n_abs_n.zip_map(&rho, |nn, rho| {
            self.rotor.torque_coefficient * rho * nn * d.powi(5)
        });
        let thrust = n_abs_n.zip_map(&rho, |nn, rho| {
            self.rotor.thrust_coefficient * rho * nn * d.powi(4)
        });
        let power = current.map(|i| v * i);
        let heat = current.map(|i| i * i * r);

        for p in power.iter() {
            check_finite(*p, "rotor electrical power")?;
        }

        conditions.set_scalar(&self.path("current"), &current)?;
        conditions.set_scalar(&self.path("power"), &power)?;
        conditions.set_scalar(&self.path("motor_torque"), &motor_torque)?;
        conditions.set_scalar(&self.path("rotor_torque"), &rotor_torque)?;
        conditions.set_scalar(&self.path("thrust"), &thrust)?;
        conditions.set_scalar(&self.path("heat"), &heat)?;
        conditions.set_column(&self.path("force"), 0, &thrust)?;
        Ok(())
    }

    fn append_residuals(&self, conditions: &Conditions, residuals: &mut Registry) -> MissionResult<()> {
        let q_motor = conditions.scalar(&self.path("motor_torque"))?;
        let q_rotor = conditions.scalar(&self.path("rotor_torque"))?;
        let defect: Vec<f64> = q_motor
            .iter()
            .zip(q_rotor.iter())
            .map(|(&qm, &qr)| torque_balance_residual(nm(qm), nm(qr)))
            .collect();
        residuals.upsert(&self.residual(), &defect)?;
        Ok(())
    }

    fn force_path(&self) -> Option<String> {
        Some(self.path("force"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_core::units::{m, ohms, radps, volts};
    use ms_mission::MissionError;
    use nalgebra::DVector;

    fn rotor(tag: &str) -> ElectricRotor {
        ElectricRotor::new(
            tag,
            Motor {
                kv: 1.5,
                resistance: ohms(0.05),
                no_load_current: 2.0,
            },
            Rotor {
                diameter: m(1.2),
                thrust_coefficient: 0.1,
                torque_coefficient: 0.01,
            },
            volts(400.0),
            1.0,
            radps(500.0),
        )
        .unwrap()
    }

    #[test]
    fn torque_balance_is_motor_minus_rotor() {
        assert_eq!(torque_balance_residual(nm(120.0), nm(120.0)), 0.0);
        assert_eq!(torque_balance_residual(nm(120.0), nm(115.0)), 5.0);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let motor = Motor {
            kv: 0.0,
            resistance: ohms(0.1),
            no_load_current: 2.0,
        };
        let blades = Rotor {
            diameter: m(1.8),
            thrust_coefficient: 0.1,
            torque_coefficient: 0.01,
        };
        assert!(
            ElectricRotor::new("r", motor, blades.clone(), volts(400.0), 1.0, radps(300.0))
                .is_err()
        );

        let motor = Motor {
            kv: 1.5,
            resistance: ohms(0.1),
            no_load_current: 2.0,
        };
        assert!(ElectricRotor::new("r", motor, blades, volts(400.0), 1.5, radps(300.0)).is_err());
    }

    fn with_density(rotor: &ElectricRotor, rho: f64) -> Conditions {
        let mut c = Conditions::new(2);
        c.declare(paths::DENSITY, 1).unwrap();
        c.fill_column(paths::DENSITY, 0, rho).unwrap();
        rotor.append_conditions(&mut c).unwrap();
        c
    }

    #[test]
    fn negative_speed_stays_finite() {
        let rotor = rotor("rotor");
        let mut c = with_density(&rotor, 1.225);
        c.set_scalar(&rotor.path("rotor_speed"), &DVector::from_vec(vec![-50.0, 0.0]))
            .unwrap();
        rotor.compute(&mut c).unwrap();

        let q_rotor = c.scalar(&rotor.path("rotor_torque")).unwrap();
        assert!(q_rotor[0] < 0.0);
        assert_eq!(q_rotor[1], 0.0);
        let current = c.scalar(&rotor.path("current")).unwrap();
        assert!((current[1] - 8_000.0).abs() < 1e-9);
    }

    #[test]
    fn thrust_is_published_as_force() {
        let rotor = rotor("rotor");
        let mut c = with_density(&rotor, 1.0);
        c.set_scalar(&rotor.path("rotor_speed"), &DVector::from_vec(vec![2.0 * PI, 4.0 * PI]))
            .unwrap();
        rotor.compute(&mut c).unwrap();

        let force = c.entry(&rotor.path("force")).unwrap();
        let d4 = 1.2_f64.powi(4);
        assert!((force[(0, 0)] - 0.1 * d4).abs() < 1e-12);
        assert!((force[(1, 0)] - 0.4 * d4).abs() < 1e-12);
        assert_eq!(force[(0, 2)], 0.0);
        assert_eq!(rotor.force_path(), Some("energy.rotor.force".to_string()));
    }

    #[test]
    fn missing_atmosphere_is_configuration_error() {
        let rotor = rotor("rotor");
        let mut c = Conditions::new(2);
        rotor.append_conditions(&mut c).unwrap();
        let err = rotor.compute(&mut c).unwrap_err();
        assert!(matches!(err, MissionError::Configuration { .. }));
        assert!(err.to_string().contains("atmosphere"));
    }

    #[test]
    fn unset_density_is_configuration_error() {
        let rotor = rotor("rotor");
        let mut c = with_density(&rotor, 0.0);
        let err = rotor.compute(&mut c).unwrap_err();
        assert!(err.to_string().contains("non-positive freestream density"));
    }
}
