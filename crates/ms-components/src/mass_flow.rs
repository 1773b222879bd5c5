//! Fixed mass flow leaving the vehicle.

use crate::common::require_non_negative;
use crate::error::ComponentResult;
use ms_core::units::MassRate;
use ms_mission::{Conditions, Contributor, MissionResult, paths};

/// Constant mass flow, e.g. payload drop or a fuel burn at a fixed rate.
#[derive(Clone, Debug)]
pub struct ConstantMassFlow {
    tag: String,
    rate: MassRate,
}

impl ConstantMassFlow {
    pub fn new(tag: impl Into<String>, rate: MassRate) -> ComponentResult<Self> {
        require_non_negative(rate.value, "mass flow rate cannot be negative")?;
        Ok(Self {
            tag: tag.into(),
            rate,
        })
    }
}

impl Contributor for ConstantMassFlow {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.declare(&paths::energy(&self.tag, "mass_flow"), 1)
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.fill_column(&paths::energy(&self.tag, "mass_flow"), 0, self.rate.value)
    }

    fn mass_flow_path(&self) -> Option<String> {
        Some(paths::energy(&self.tag, "mass_flow"))
    }
}
