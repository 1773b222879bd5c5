//! Parasite drag of the airframe.
//!
//! `D = ½ ρ V|V| S CD`, acting against the x axis. The force joins the
//! longitudinal balance of accelerating segments.

use crate::common::{freestream_density, require_positive};
use crate::error::ComponentResult;
use ms_core::units::Area;
use ms_mission::{Conditions, Contributor, MissionResult, paths};

#[derive(Clone, Debug)]
pub struct ParasiteDrag {
    tag: String,
    reference_area: Area,
    drag_coefficient: f64,
}

impl ParasiteDrag {
    pub fn new(
        tag: impl Into<String>,
        reference_area: Area,
        drag_coefficient: f64,
    ) -> ComponentResult<Self> {
        require_positive(reference_area.value, "reference area must be positive")?;
        require_positive(drag_coefficient, "drag coefficient must be positive")?;
        Ok(Self {
            tag: tag.into(),
            reference_area,
            drag_coefficient,
        })
    }

    fn path(&self, field: &str) -> String {
        paths::energy(&self.tag, field)
    }
}

impl Contributor for ParasiteDrag {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.declare(&self.path("drag"), 1)?;
        conditions.declare(&self.path("force"), 3)
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        let rho = freestream_density(conditions, "drag", &self.tag)?;
        let v = conditions.column(paths::VELOCITY, 0)?;
        let s_cd = self.reference_area.value * self.drag_coefficient;
        let drag = rho.zip_map(&v, |rho, v| 0.5 * rho * v * v.abs() * s_cd);

        conditions.set_scalar(&self.path("drag"), &drag.abs())?;
        conditions.set_column(&self.path("force"), 0, &(-drag))
    }

    fn force_path(&self) -> Option<String> {
        Some(self.path("force"))
    }
}
