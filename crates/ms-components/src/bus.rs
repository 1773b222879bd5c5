//! Electrical bus aggregating the power drawn by its loads.

use crate::common::{require_positive, sum_fields};
use crate::error::ComponentResult;
use ms_core::units::Voltage;
use ms_mission::{Conditions, Contributor, MissionResult, paths};

/// Sums `energy.<load>.power` of every load into `energy.<bus>.power_draw`.
///
/// Loads must be declared before the bus in the segment so their power is
/// current when the bus computes.
#[derive(Clone, Debug)]
pub struct ElectricBus {
    tag: String,
    voltage: Voltage,
    loads: Vec<String>,
}

impl ElectricBus {
    pub fn new(tag: impl Into<String>, voltage: Voltage, loads: Vec<String>) -> ComponentResult<Self> {
        require_positive(voltage.value, "bus voltage must be positive")?;
        Ok(Self {
            tag: tag.into(),
            voltage,
            loads,
        })
    }
}

impl Contributor for ElectricBus {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        conditions.declare(&paths::energy(&self.tag, "power_draw"), 1)?;
        conditions.declare(&paths::energy(&self.tag, "current"), 1)
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        let power = sum_fields(conditions, &self.loads, "power")?;
        let current = &power / self.voltage.value;
        conditions.set_scalar(&paths::energy(&self.tag, "power_draw"), &power)?;
        conditions.set_scalar(&paths::energy(&self.tag, "current"), &current)
    }
}
