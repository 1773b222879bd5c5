//! Boundary parameters of a segment.

use crate::error::{MissionError, MissionResult};
use ms_core::numeric::ensure_divisor;
use ms_core::units::{Length, Mass, Time, Velocity, mps};

/// How far a segment extends. The two forms are mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extent {
    /// Fixed duration, or the initial guess of the elapsed time for an
    /// accelerating segment
    Duration(Time),
    /// Horizontal distance, flown at the profile speed
    Distance(Length),
}

/// How the horizontal speed evolves over a segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Motion {
    /// Constant speed given by [`Profile::speed`]
    #[default]
    Steady,
    /// Constant Mach number; the speed is the Mach number times the speed of
    /// sound at the first control point
    ConstantMach { mach: f64 },
    /// Level acceleration from [`Profile::speed`] to `speed_end`. The
    /// acceleration history and the elapsed time are solved for.
    Accelerating { speed_end: Velocity },
}

/// Prescribed flight profile of one segment.
///
/// `altitude` and `initial_mass` are either fixed here or inherited from the
/// previous segment's terminal state.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub altitude: Option<Length>,
    pub extent: Extent,
    /// Horizontal speed; the start speed of an accelerating segment
    pub speed: Velocity,
    /// Positive when climbing
    pub climb_rate: Velocity,
    pub initial_mass: Option<Mass>,
    pub motion: Motion,
}

impl Profile {
    pub fn new(extent: Extent, speed: Velocity) -> Self {
        Self {
            altitude: None,
            extent,
            speed,
            climb_rate: mps(0.0),
            initial_mass: None,
            motion: Motion::Steady,
        }
    }

    /// Fly `distance` at a constant Mach number.
    pub fn constant_mach(distance: Length, mach: f64) -> Self {
        Self {
            motion: Motion::ConstantMach { mach },
            ..Self::new(Extent::Distance(distance), mps(0.0))
        }
    }

    /// Accelerate in level flight from `speed_start` to `speed_end`;
    /// `time_guess` seeds the elapsed-time unknown.
    pub fn accelerating(speed_start: Velocity, speed_end: Velocity, time_guess: Time) -> Self {
        Self {
            motion: Motion::Accelerating { speed_end },
            ..Self::new(Extent::Duration(time_guess), speed_start)
        }
    }

    pub fn with_altitude(mut self, altitude: Length) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_climb_rate(mut self, climb_rate: Velocity) -> Self {
        self.climb_rate = climb_rate;
        self
    }

    pub fn with_initial_mass(mut self, mass: Mass) -> Self {
        self.initial_mass = Some(mass);
        self
    }

    /// Segment duration in seconds at the profile speed.
    ///
    /// Constant-Mach segments have no duration until the speed of sound is
    /// known; see [`Profile::duration_at`].
    ///
    /// # Errors
    /// A non-positive duration, or a distance extent flown at a non-positive
    /// speed, is a configuration error.
    pub fn duration(&self) -> MissionResult<f64> {
        self.duration_at(self.speed.value)
    }

    /// Segment duration in seconds when flown at `speed`.
    pub fn duration_at(&self, speed: f64) -> MissionResult<f64> {
        let duration = match self.extent {
            Extent::Duration(t) => t.value,
            Extent::Distance(d) => {
                if speed.is_nan() || speed <= 0.0 {
                    return Err(MissionError::configuration(format!(
                        "distance extent requires a positive speed, got {speed} m/s"
                    )));
                }
                d.value / speed
            }
        };
        if !duration.is_finite() || duration <= 0.0 {
            return Err(MissionError::configuration(format!(
                "segment duration must be positive, got {duration} s"
            )));
        }
        Ok(duration)
    }

    /// Horizontal speed of a constant-Mach segment at the given speed of
    /// sound.
    pub fn mach_speed(&self, speed_of_sound: f64) -> MissionResult<f64> {
        let Motion::ConstantMach { mach } = self.motion else {
            return Ok(self.speed.value);
        };
        let a = ensure_divisor(speed_of_sound, "speed of sound")?;
        Ok(mach * a)
    }

    /// Check the motion against the extent.
    pub fn check_motion(&self) -> MissionResult<()> {
        match self.motion {
            Motion::Steady => Ok(()),
            Motion::ConstantMach { mach } => {
                if !(mach.is_finite() && mach > 0.0) {
                    return Err(MissionError::configuration(format!(
                        "Mach number must be positive, got {mach}"
                    )));
                }
                if !matches!(self.extent, Extent::Distance(_)) {
                    return Err(MissionError::configuration(
                        "a constant-Mach segment is bounded by distance",
                    ));
                }
                Ok(())
            }
            Motion::Accelerating { speed_end } => {
                if !matches!(self.extent, Extent::Duration(_)) {
                    return Err(MissionError::configuration(
                        "an accelerating segment takes a duration guess, not a distance",
                    ));
                }
                if self.climb_rate.value != 0.0 {
                    return Err(MissionError::configuration(
                        "an accelerating segment flies level",
                    ));
                }
                let (v0, vf) = (self.speed.value, speed_end.value);
                if !(v0.is_finite() && vf.is_finite() && v0 >= 0.0 && vf > 0.0) {
                    return Err(MissionError::configuration(format!(
                        "accelerating segment speeds must be finite and positive, got {v0} and {vf} m/s"
                    )));
                }
                if v0 == vf {
                    return Err(MissionError::configuration(format!(
                        "accelerating segment starts and ends at {v0} m/s"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Inertial velocity in the north-east-down frame at horizontal `speed`.
    pub fn velocity_at(&self, speed: f64) -> [f64; 3] {
        [speed, 0.0, -self.climb_rate.value]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_core::units::{m, s};

    #[test]
    fn distance_resolves_to_duration() {
        let p = Profile::new(Extent::Distance(m(12_000.0)), mps(60.0));
        assert!((p.duration().unwrap() - 200.0).abs() < 1e-12);
    }

    #[test]
    fn distance_without_speed_is_rejected() {
        let p = Profile::new(Extent::Distance(m(1_000.0)), mps(0.0));
        assert!(matches!(
            p.duration().unwrap_err(),
            MissionError::Configuration { .. }
        ));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let p = Profile::new(Extent::Duration(s(0.0)), mps(50.0));
        assert!(p.duration().is_err());
    }

    #[test]
    fn climb_points_up() {
        let p = Profile::new(Extent::Duration(s(60.0)), mps(40.0)).with_climb_rate(mps(5.0));
        assert_eq!(p.velocity_at(p.speed.value), [40.0, 0.0, -5.0]);
    }

    #[test]
    fn mach_speed_scales_speed_of_sound() {
        let p = Profile::constant_mach(m(34_000.0), 0.5);
        p.check_motion().unwrap();
        assert_eq!(p.mach_speed(340.0).unwrap(), 170.0);
        assert!((p.duration_at(170.0).unwrap() - 200.0).abs() < 1e-12);
        assert!(matches!(
            p.mach_speed(0.0).unwrap_err(),
            MissionError::Configuration { .. }
        ));
    }

    #[test]
    fn steady_speed_ignores_speed_of_sound() {
        let p = Profile::new(Extent::Duration(s(60.0)), mps(40.0));
        assert_eq!(p.mach_speed(0.0).unwrap(), 40.0);
    }

    #[test]
    fn accelerating_motion_is_checked() {
        let p = Profile::accelerating(mps(40.0), mps(60.0), s(30.0));
        p.check_motion().unwrap();

        let same = Profile::accelerating(mps(40.0), mps(40.0), s(30.0));
        assert!(same.check_motion().unwrap_err().to_string().contains("starts and ends"));

        let climbing = p.clone().with_climb_rate(mps(2.0));
        assert!(climbing.check_motion().is_err());

        let mut by_distance = p;
        by_distance.extent = Extent::Distance(m(1_000.0));
        assert!(by_distance.check_motion().is_err());
    }
}
