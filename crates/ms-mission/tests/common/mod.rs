#![allow(dead_code)]

use ms_core::units::{kg, m, mps, s};
use ms_mission::{
    Conditions, Contributor, Extent, MissionResult, Numerics, Profile, Segment, paths,
};
use ms_solver::Registry;

/// One scalar unknown `u` with residual `u - target`.
///
/// With `clamp` set, the guess is ignored and the clamp value is written
/// instead, so the residual can never vanish.
pub struct Target {
    pub tag: String,
    pub target: f64,
    pub guess: f64,
    pub clamp: Option<f64>,
}

impl Target {
    pub fn new(tag: &str, target: f64) -> Self {
        Self {
            tag: tag.to_string(),
            target,
            guess: 1.0,
            clamp: None,
        }
    }

    pub fn clamped(mut self, value: f64) -> Self {
        self.clamp = Some(value);
        self
    }

    pub fn unknown(&self) -> String {
        format!("{}_value", self.tag)
    }

    pub fn path(&self) -> String {
        paths::energy(&self.tag, "value")
    }
}

impl Contributor for Target {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.declare(&self.path(), 1)
    }

    fn append_unknowns(&self, _n_points: usize, unknowns: &mut Registry) -> MissionResult<()> {
        unknowns.declare(self.unknown(), vec![self.guess])?;
        Ok(())
    }

    fn consume_unknowns(&self, unknowns: &Registry, conditions: &mut Conditions) -> MissionResult<()> {
        let u = unknowns.require(&self.unknown())?[0];
        conditions.fill_column(&self.path(), 0, self.clamp.unwrap_or(u))
    }

    fn compute(&self, _conditions: &mut Conditions) -> MissionResult<()> {
        Ok(())
    }

    fn append_residuals(&self, conditions: &Conditions, residuals: &mut Registry) -> MissionResult<()> {
        let u = conditions.scalar(&self.path())?[0];
        residuals.upsert(&self.unknown(), &[u - self.target])?;
        Ok(())
    }
}

/// Time-varying unknown solving `u^3 + u = t / 10` at every control point.
pub struct Cubic;

impl Contributor for Cubic {
    fn tag(&self) -> &str {
        "cubic"
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.declare(&paths::energy("cubic", "u"), 1)?;
        conditions.declare(&paths::energy("cubic", "defect"), 1)
    }

    fn append_unknowns(&self, n_points: usize, unknowns: &mut Registry) -> MissionResult<()> {
        unknowns.declare("cubic_u", vec![0.5; n_points])?;
        Ok(())
    }

    fn consume_unknowns(&self, unknowns: &Registry, conditions: &mut Conditions) -> MissionResult<()> {
        let u = unknowns.require("cubic_u")?;
        conditions.set_scalar(
            &paths::energy("cubic", "u"),
            &nalgebra::DVector::from_column_slice(u),
        )
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        let u = conditions.scalar(&paths::energy("cubic", "u"))?;
        let t = conditions.scalar(paths::TIME)?;
        let defect = u.zip_map(&t, |u, t| u.powi(3) + u - t / 10.0);
        conditions.set_scalar(&paths::energy("cubic", "defect"), &defect)
    }

    fn append_residuals(&self, conditions: &Conditions, residuals: &mut Registry) -> MissionResult<()> {
        let defect = conditions.scalar(&paths::energy("cubic", "defect"))?;
        residuals.upsert("cubic_defect", defect.as_slice())?;
        Ok(())
    }
}

/// Fixed mass flow without unknowns.
pub struct Burn {
    pub tag: String,
    pub rate: f64,
}

impl Contributor for Burn {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.declare(&paths::energy(&self.tag, "mass_flow"), 1)
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.fill_column(&paths::energy(&self.tag, "mass_flow"), 0, self.rate)
    }

    fn mass_flow_path(&self) -> Option<String> {
        Some(paths::energy(&self.tag, "mass_flow"))
    }
}

/// Declares an unknown but no residual.
pub struct Unbalanced;

impl Contributor for Unbalanced {
    fn tag(&self) -> &str {
        "unbalanced"
    }

    fn append_unknowns(&self, _n_points: usize, unknowns: &mut Registry) -> MissionResult<()> {
        unknowns.declare("unbalanced_x", vec![0.0])?;
        Ok(())
    }

    fn compute(&self, _conditions: &mut Conditions) -> MissionResult<()> {
        Ok(())
    }
}

/// Residual `sqrt(u) - 1`, undefined for negative guesses.
pub struct SquareRoot {
    pub guess: f64,
}

impl Contributor for SquareRoot {
    fn tag(&self) -> &str {
        "sqrt"
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.declare(&paths::energy("sqrt", "u"), 1)
    }

    fn append_unknowns(&self, _n_points: usize, unknowns: &mut Registry) -> MissionResult<()> {
        unknowns.declare("sqrt_u", vec![self.guess])?;
        Ok(())
    }

    fn consume_unknowns(&self, unknowns: &Registry, conditions: &mut Conditions) -> MissionResult<()> {
        let u = unknowns.require("sqrt_u")?[0];
        conditions.fill_column(&paths::energy("sqrt", "u"), 0, u)
    }

    fn compute(&self, _conditions: &mut Conditions) -> MissionResult<()> {
        Ok(())
    }

    fn append_residuals(&self, conditions: &Conditions, residuals: &mut Registry) -> MissionResult<()> {
        let u = conditions.scalar(&paths::energy("sqrt", "u"))?[0];
        residuals.upsert("sqrt_defect", &[u.sqrt() - 1.0])?;
        Ok(())
    }
}

pub fn cruise_profile() -> Profile {
    Profile::new(Extent::Duration(s(100.0)), mps(50.0))
        .with_altitude(m(500.0))
        .with_initial_mass(kg(2_000.0))
}

pub fn numerics(points: usize) -> Numerics {
    Numerics {
        number_of_control_points: points,
        ..Numerics::default()
    }
}

pub fn segment(tag: &str) -> Segment {
    Segment::new(tag, cruise_profile()).with_numerics(numerics(8))
}

/// Constant force along the x axis.
pub struct Thruster {
    pub force: f64,
}

impl Contributor for Thruster {
    fn tag(&self) -> &str {
        "thruster"
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.declare(&paths::energy("thruster", "force"), 3)
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.fill_column(&paths::energy("thruster", "force"), 0, self.force)
    }

    fn force_path(&self) -> Option<String> {
        Some(paths::energy("thruster", "force"))
    }
}

/// Uniform speed of sound, standing in for an atmosphere.
pub struct SoundSpeed(pub f64);

impl Contributor for SoundSpeed {
    fn tag(&self) -> &str {
        "sound"
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.declare(paths::SPEED_OF_SOUND, 1)
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.fill_column(paths::SPEED_OF_SOUND, 0, self.0)
    }
}
