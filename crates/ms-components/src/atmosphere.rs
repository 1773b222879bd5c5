//! International Standard Atmosphere.

use crate::common::check_finite;
use ms_core::units::constants::G0_MPS2;
use ms_mission::{Conditions, Contributor, MissionResult, paths};
use nalgebra::DVector;

const T0: f64 = 288.15;
const P0: f64 = 101_325.0;
const LAPSE_RATE: f64 = 0.0065;
const TROPOPAUSE: f64 = 11_000.0;
const GAS_CONSTANT: f64 = 287.052_87;
const GAMMA: f64 = 1.4;
const EARTH_RADIUS: f64 = 6_371_000.0;

/// Freestream properties at one altitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtmosphereState {
    pub temperature: f64,
    pub pressure: f64,
    pub density: f64,
    pub speed_of_sound: f64,
    pub gravity: f64,
}

/// Two-layer ISA model (troposphere and lower stratosphere) with an optional
/// temperature offset, writing the `freestream.*` conditions from
/// `freestream.altitude`.
#[derive(Clone, Debug)]
pub struct StandardAtmosphere {
    pub tag: String,
    /// Added to the ISA temperature (K); pressure follows the standard day
    pub temperature_offset: f64,
}

impl StandardAtmosphere {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            temperature_offset: 0.0,
        }
    }

    pub fn with_temperature_offset(mut self, offset: f64) -> Self {
        self.temperature_offset = offset;
        self
    }

    /// Properties at geometric altitude `h` (m).
    pub fn at(&self, h: f64) -> AtmosphereState {
        let (t_std, pressure) = if h <= TROPOPAUSE {
            let t = T0 - LAPSE_RATE * h;
            let p = P0 * (t / T0).powf(G0_MPS2 / (LAPSE_RATE * GAS_CONSTANT));
            (t, p)
        } else {
            let t = T0 - LAPSE_RATE * TROPOPAUSE;
            let p_tropopause = P0 * (t / T0).powf(G0_MPS2 / (LAPSE_RATE * GAS_CONSTANT));
            let p = p_tropopause * (-G0_MPS2 * (h - TROPOPAUSE) / (GAS_CONSTANT * t)).exp();
            (t, p)
        };
        let temperature = t_std + self.temperature_offset;
        let ratio = EARTH_RADIUS / (EARTH_RADIUS + h);

        AtmosphereState {
            temperature,
            pressure,
            density: pressure / (GAS_CONSTANT * temperature),
            speed_of_sound: (GAMMA * GAS_CONSTANT * temperature).sqrt(),
            gravity: G0_MPS2 * ratio * ratio,
        }
    }
}

impl Contributor for StandardAtmosphere {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        for path in [
            paths::TEMPERATURE,
            paths::PRESSURE,
            paths::DENSITY,
            paths::SPEED_OF_SOUND,
        ] {
            conditions.declare(path, 1)?;
        }
        Ok(())
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        let altitude = conditions.scalar(paths::ALTITUDE)?;
        let states: Vec<AtmosphereState> = altitude.iter().map(|&h| self.at(h)).collect();
        for state in &states {
            check_finite(state.density, "freestream density")?;
            check_finite(state.speed_of_sound, "freestream speed of sound")?;
        }

        let n = states.len();
        let column = |f: fn(&AtmosphereState) -> f64| DVector::from_fn(n, |i, _| f(&states[i]));
        conditions.set_scalar(paths::TEMPERATURE, &column(|s| s.temperature))?;
        conditions.set_scalar(paths::PRESSURE, &column(|s| s.pressure))?;
        conditions.set_scalar(paths::DENSITY, &column(|s| s.density))?;
        conditions.set_scalar(paths::SPEED_OF_SOUND, &column(|s| s.speed_of_sound))?;
        conditions.set_scalar(paths::GRAVITY, &column(|s| s.gravity))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_standard_day() {
        let s = StandardAtmosphere::new("atmosphere").at(0.0);
        assert_eq!(s.temperature, 288.15);
        assert_eq!(s.pressure, 101_325.0);
        assert!((s.density - 1.225).abs() < 1e-3);
        assert!((s.speed_of_sound - 340.29).abs() < 0.01);
        assert_eq!(s.gravity, G0_MPS2);
    }

    #[test]
    fn tropopause_and_above() {
        let atm = StandardAtmosphere::new("atmosphere");
        let s = atm.at(11_000.0);
        assert!((s.temperature - 216.65).abs() < 1e-9);
        assert!((s.pressure - 22_632.0).abs() < 5.0);

        let above = atm.at(15_000.0);
        assert_eq!(above.temperature, s.temperature);
        assert!((above.pressure - 12_045.0).abs() < 10.0);
    }

    #[test]
    fn hot_day_lowers_density() {
        let standard = StandardAtmosphere::new("a").at(1_000.0);
        let hot = StandardAtmosphere::new("a")
            .with_temperature_offset(15.0)
            .at(1_000.0);
        assert_eq!(hot.pressure, standard.pressure);
        assert!(hot.density < standard.density);
    }

    #[test]
    fn writes_freestream_conditions() {
        let atm = StandardAtmosphere::new("atmosphere");
        let mut c = Conditions::new(3);
        c.declare(paths::ALTITUDE, 1).unwrap();
        c.declare(paths::GRAVITY, 1).unwrap();
        c.set_scalar(paths::ALTITUDE, &DVector::from_vec(vec![0.0, 500.0, 1_000.0]))
            .unwrap();
        atm.append_conditions(&mut c).unwrap();
        atm.compute(&mut c).unwrap();

        let rho = c.scalar(paths::DENSITY).unwrap();
        assert!(rho[0] > rho[1] && rho[1] > rho[2]);
        let g = c.scalar(paths::GRAVITY).unwrap();
        assert!(g[2] < g[0]);
    }
}
