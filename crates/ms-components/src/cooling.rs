//! Coolant loop rejecting component waste heat to ambient air.

use crate::common::{copy_unknown, require_positive, sum_fields};
use crate::error::ComponentResult;
use ms_core::units::Temperature;
use ms_mission::{Conditions, Contributor, MissionResult, paths};
use ms_solver::Registry;

const HEAT_SCALE: f64 = 1e4;

/// Lumped heat exchanger with conductance `UA`.
///
/// The unknown is the coolant temperature; the residual is the steady heat
/// balance `(Q_load - UA · (T - T_ambient)) / 1e4`, where `Q_load` sums the
/// `heat` condition of every source. Ambient temperature is fixed or read
/// from `freestream.temperature`.
#[derive(Clone, Debug)]
pub struct CoolingLoop {
    tag: String,
    sources: Vec<String>,
    /// Conductance (W/K)
    conductance: f64,
    ambient: Option<Temperature>,
    initial_temperature: Temperature,
}

impl CoolingLoop {
    pub fn new(
        tag: impl Into<String>,
        sources: Vec<String>,
        conductance: f64,
        initial_temperature: Temperature,
    ) -> ComponentResult<Self> {
        require_positive(conductance, "heat exchanger conductance must be positive")?;
        require_positive(initial_temperature.value, "coolant temperature must be positive")?;
        Ok(Self {
            tag: tag.into(),
            sources,
            conductance,
            ambient: None,
            initial_temperature,
        })
    }

    pub fn with_ambient(mut self, ambient: Temperature) -> Self {
        self.ambient = Some(ambient);
        self
    }

    fn unknown(&self) -> String {
        format!("{}_coolant_temperature", self.tag)
    }

    fn path(&self, field: &str) -> String {
        paths::energy(&self.tag, field)
    }
}

impl Contributor for CoolingLoop {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        for field in ["coolant_temperature", "heat_load", "heat_rejected"] {
            conditions.declare(&self.path(field), 1)?;
        }
        if self.ambient.is_none() {
            conditions.declare(paths::TEMPERATURE, 1)?;
        }
        Ok(())
    }

    fn append_unknowns(&self, n_points: usize, unknowns: &mut Registry) -> MissionResult<()> {
        unknowns.declare(self.unknown(), vec![self.initial_temperature.value; n_points])?;
        Ok(())
    }

    fn consume_unknowns(&self, unknowns: &Registry, conditions: &mut Conditions) -> MissionResult<()> {
        copy_unknown(unknowns, &self.unknown(), conditions, &self.path("coolant_temperature"))
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        let load = sum_fields(conditions, &self.sources, "heat")?;
        let coolant = conditions.scalar(&self.path("coolant_temperature"))?;
        let rejected = match self.ambient {
            Some(t) => coolant.map(|tc| self.conductance * (tc - t.value)),
            None => {
                let ambient = conditions.scalar(paths::TEMPERATURE)?;
                (coolant - ambient) * self.conductance
            }
        };
        conditions.set_scalar(&self.path("heat_load"), &load)?;
        conditions.set_scalar(&self.path("heat_rejected"), &rejected)
    }

    fn append_residuals(&self, conditions: &Conditions, residuals: &mut Registry) -> MissionResult<()> {
        let load = conditions.scalar(&self.path("heat_load"))?;
        let rejected = conditions.scalar(&self.path("heat_rejected"))?;
        let defect = (load - rejected) / HEAT_SCALE;
        residuals.upsert(&format!("{}_heat_balance", self.tag), defect.as_slice())?;
        Ok(())
    }
}
