//! Hydrogen fuel cell stacks supplying an electrical bus.
//!
//! ## Model
//!
//! The unknown is the cell current density `j` (A/m²).
//!
//! ```text
//! V_cell  = E0 - ASR · j
//! P_stack = cells · V_cell · j · A
//! Q_waste = cells · (1.48 - V_cell) · j · A
//! ṁ_H2    = stacks · cells · j · A / (2F) · M_H2
//! ```
//!
//! Every stack carries an equal share of the bus power draw; the residual is
//! `(P_bus / stacks - P_stack) / 1e4`. The `heat` condition is the waste
//! heat of all stacks together.

use crate::common::{check_finite, copy_unknown, require_positive};
use crate::error::{ComponentError, ComponentResult};
use ms_core::units::Area;
use ms_mission::{Conditions, Contributor, MissionResult, paths};
use ms_solver::Registry;
use nalgebra::DVector;

const FARADAY: f64 = 96_485.332;
const HYDROGEN_MOLAR_MASS: f64 = 2.016e-3;
/// Thermoneutral cell voltage (higher heating value)
const THERMONEUTRAL_VOLTAGE: f64 = 1.48;
const POWER_SCALE: f64 = 1e4;

#[derive(Clone, Debug, PartialEq)]
pub struct CellParameters {
    pub cells_per_stack: usize,
    pub cell_area: Area,
    /// Open-circuit cell voltage (V)
    pub open_circuit_voltage: f64,
    /// Area-specific resistance (Ω·m²)
    pub area_specific_resistance: f64,
}

#[derive(Clone, Debug)]
pub struct FuelCellStack {
    tag: String,
    bus: String,
    number_of_stacks: usize,
    cell: CellParameters,
    initial_current_density: f64,
}

impl FuelCellStack {
    /// # Errors
    /// Zero stacks or cells and non-positive cell parameters are rejected.
    pub fn new(
        tag: impl Into<String>,
        bus: impl Into<String>,
        number_of_stacks: usize,
        cell: CellParameters,
        initial_current_density: f64,
    ) -> ComponentResult<Self> {
        if number_of_stacks == 0 {
            return Err(ComponentError::InvalidArg {
                what: "a fuel cell bus needs at least one stack",
            });
        }
        if cell.cells_per_stack == 0 {
            return Err(ComponentError::InvalidArg {
                what: "a fuel cell stack needs at least one cell",
            });
        }
        require_positive(cell.cell_area.value, "cell area must be positive")?;
        require_positive(cell.open_circuit_voltage, "open-circuit voltage must be positive")?;
        require_positive(
            cell.area_specific_resistance,
            "area-specific resistance must be positive",
        )?;
        require_positive(initial_current_density, "initial current density must be positive")?;

        Ok(Self {
            tag: tag.into(),
            bus: bus.into(),
            number_of_stacks,
            cell,
            initial_current_density,
        })
    }

    fn unknown(&self) -> String {
        format!("{}_current_density", self.tag)
    }

    fn residual(&self) -> String {
        format!("{}_power_balance", self.tag)
    }

    fn path(&self, field: &str) -> String {
        paths::energy(&self.tag, field)
    }

    /// Cell voltage, stack power and stack waste heat at current density `j`.
    pub fn operating_point(&self, j: f64) -> (f64, f64, f64) {
        let cells = self.cell.cells_per_stack as f64;
        let area = self.cell.cell_area.value;
        let v_cell = self.cell.open_circuit_voltage - self.cell.area_specific_resistance * j;
        let power = cells * v_cell * j * area;
        let heat = cells * (THERMONEUTRAL_VOLTAGE - v_cell) * j * area;
        (v_cell, power, heat)
    }
}

impl Contributor for FuelCellStack {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn append_conditions(&self, conditions: &mut Conditions) -> MissionResult<()> {
        for field in [
            "current_density",
            "cell_voltage",
            "stack_power",
            "power_required",
            "heat",
            "hydrogen_mass_flow",
        ] {
            conditions.declare(&self.path(field), 1)?;
        }
        Ok(())
    }

    fn append_unknowns(&self, n_points: usize, unknowns: &mut Registry) -> MissionResult<()> {
        unknowns.declare(self.unknown(), vec![self.initial_current_density; n_points])?;
        Ok(())
    }

    fn consume_unknowns(&self, unknowns: &Registry, conditions: &mut Conditions) -> MissionResult<()> {
        copy_unknown(unknowns, &self.unknown(), conditions, &self.path("current_density"))
    }

    fn compute(&self, conditions: &mut Conditions) -> MissionResult<()> {
        let stacks = self.number_of_stacks as f64;
        let j = conditions.scalar(&self.path("current_density"))?;
        let bus_power = conditions.scalar(&paths::energy(&self.bus, "power_draw"))?;

        let points: Vec<(f64, f64, f64)> = j.iter().map(|&j| self.operating_point(j)).collect();
        let n = points.len();
        let voltage = DVector::from_fn(n, |i, _| points[i].0);
        let power = DVector::from_fn(n, |i, _| points[i].1);
        let heat = DVector::from_fn(n, |i, _| points[i].2 * stacks);
        let hydrogen = j.map(|j| {
            stacks * self.cell.cells_per_stack as f64 * j * self.cell.cell_area.value
                / (2.0 * FARADAY)
                * HYDROGEN_MOLAR_MASS
        });
        let required = &bus_power / stacks;

        for p in power.iter() {
            check_finite(*p, "fuel cell stack power")?;
        }

        conditions.set_scalar(&self.path("cell_voltage"), &voltage)?;
        conditions.set_scalar(&self.path("stack_power"), &power)?;
        conditions.set_scalar(&self.path("power_required"), &required)?;
        conditions.set_scalar(&self.path("heat"), &heat)?;
        conditions.set_scalar(&self.path("hydrogen_mass_flow"), &hydrogen)?;
        Ok(())
    }

    fn append_residuals(&self, conditions: &Conditions, residuals: &mut Registry) -> MissionResult<()> {
        let required = conditions.scalar(&self.path("power_required"))?;
        let produced = conditions.scalar(&self.path("stack_power"))?;
        let defect = (required - produced) / POWER_SCALE;
        residuals.upsert(&self.residual(), defect.as_slice())?;
        Ok(())
    }

    fn mass_flow_path(&self) -> Option<String> {
        Some(self.path("hydrogen_mass_flow"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_core::units::m2;

    fn cell() -> CellParameters {
        CellParameters {
            cells_per_stack: 400,
            cell_area: m2(0.03),
            open_circuit_voltage: 1.0,
            area_specific_resistance: 1e-5,
        }
    }

    #[test]
    fn zero_stacks_are_rejected() {
        let err = FuelCellStack::new("fc", "bus", 0, cell(), 5_000.0).unwrap_err();
        assert!(err.to_string().contains("at least one stack"));
    }

    #[test]
    fn operating_point_follows_polarization_line() {
        let fc = FuelCellStack::new("fc", "bus", 2, cell(), 5_000.0).unwrap();
        let (v, p, q) = fc.operating_point(10_000.0);
        assert!((v - 0.9).abs() < 1e-12);
        assert!((p - 400.0 * 0.9 * 10_000.0 * 0.03).abs() < 1e-6);
        assert!((q - 400.0 * 0.58 * 10_000.0 * 0.03).abs() < 1e-6);
    }

    #[test]
    fn residual_splits_bus_power_between_stacks() {
        let fc = FuelCellStack::new("fc", "bus", 2, cell(), 10_000.0).unwrap();
        let mut c = Conditions::new(1);
        c.declare("energy.bus.power_draw", 1).unwrap();
        c.fill_column("energy.bus.power_draw", 0, 2.0 * 108_000.0).unwrap();
        fc.append_conditions(&mut c).unwrap();

        let mut unknowns = Registry::unknowns();
        fc.append_unknowns(1, &mut unknowns).unwrap();
        fc.consume_unknowns(&unknowns, &mut c).unwrap();
        fc.compute(&mut c).unwrap();

        let mut residuals = Registry::residuals();
        fc.append_residuals(&c, &mut residuals).unwrap();
        let r = residuals.get("fc_power_balance").unwrap()[0];
        assert!(r.abs() < 1e-9, "r = {r}");

        let h2 = c.scalar("energy.fc.hydrogen_mass_flow").unwrap()[0];
        let expected = 2.0 * 400.0 * 10_000.0 * 0.03 / (2.0 * FARADAY) * HYDROGEN_MOLAR_MASS;
        assert!((h2 - expected).abs() < 1e-12);
    }
}
