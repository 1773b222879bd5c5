//! Mission file schema definitions.
//!
//! Quantities are plain SI numbers; the unit is part of the field name.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub continuity: ContinuityDef,
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
}

/// Whether a segment may start from a predecessor that did not converge.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContinuityDef {
    #[default]
    Permissive,
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentDef {
    pub tag: String,
    pub profile: ProfileDef,
    #[serde(default)]
    pub numerics: NumericsDef,
    #[serde(default)]
    pub contributors: Vec<ContributorDef>,
}

/// Exactly one of `duration_s` and `distance_m` must be set. A missing
/// `altitude_m` or `initial_mass_kg` is inherited from the previous segment.
///
/// `mach_number` flies `distance_m` at a constant Mach number instead of
/// `speed_mps`. `speed_end_mps` accelerates level from `speed_mps`, with
/// `duration_s` as the initial guess of the elapsed time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(default)]
    pub speed_mps: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mach_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_end_mps: Option<f64>,
    #[serde(default)]
    pub climb_rate_mps: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_mass_kg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericsDef {
    #[serde(default = "default_control_points")]
    pub number_of_control_points: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance_solution: f64,
    /// `0` selects the solver default of `200 * (n + 1)`
    #[serde(default)]
    pub max_evaluations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size: Option<f64>,
    #[serde(default)]
    pub parallel_jacobian: bool,
    #[serde(default)]
    pub root_finder: RootFinderDef,
    #[serde(default)]
    pub differencing: DifferencingDef,
}

impl Default for NumericsDef {
    fn default() -> Self {
        Self {
            number_of_control_points: default_control_points(),
            tolerance_solution: default_tolerance(),
            max_evaluations: 0,
            step_size: None,
            parallel_jacobian: false,
            root_finder: RootFinderDef::default(),
            differencing: DifferencingDef::default(),
        }
    }
}

fn default_control_points() -> usize {
    16
}

fn default_tolerance() -> f64 {
    1e-8
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RootFinderDef {
    #[default]
    QuasiNewton,
    Newton,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DifferencingDef {
    #[default]
    Forward,
    Central,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributorDef {
    pub id: String,
    pub kind: ContributorKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContributorKind {
    StandardAtmosphere {
        #[serde(default)]
        temperature_offset_k: f64,
    },
    ElectricRotor {
        kv_radps_per_v: f64,
        resistance_ohm: f64,
        #[serde(default)]
        no_load_current_a: f64,
        diameter_m: f64,
        thrust_coefficient: f64,
        torque_coefficient: f64,
        voltage_v: f64,
        #[serde(default = "default_throttle")]
        throttle: f64,
        initial_speed_radps: f64,
    },
    ElectricBus {
        voltage_v: f64,
        #[serde(default)]
        loads: Vec<String>,
    },
    FuelCellStack {
        bus: String,
        number_of_stacks: usize,
        cells_per_stack: usize,
        cell_area_m2: f64,
        open_circuit_voltage_v: f64,
        area_specific_resistance_ohm_m2: f64,
        initial_current_density_a_per_m2: f64,
    },
    CoolingLoop {
        #[serde(default)]
        sources: Vec<String>,
        conductance_w_per_k: f64,
        initial_temperature_k: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ambient_temperature_k: Option<f64>,
    },
    ConstantMassFlow {
        rate_kgps: f64,
    },
    ParasiteDrag {
        reference_area_m2: f64,
        drag_coefficient: f64,
    },
}

fn default_throttle() -> f64 {
    1.0
}

impl ContributorKind {
    /// Whether the contributor reads the freestream written by an atmosphere.
    pub fn needs_atmosphere(&self) -> bool {
        matches!(
            self,
            ContributorKind::ElectricRotor { .. } | ContributorKind::ParasiteDrag { .. }
        )
    }

    /// Whether the contributor writes an `energy.<id>.power` load.
    pub fn is_electric_load(&self) -> bool {
        matches!(self, ContributorKind::ElectricRotor { .. })
    }

    /// Whether the contributor writes an `energy.<id>.heat` source.
    pub fn is_heat_source(&self) -> bool {
        matches!(
            self,
            ContributorKind::ElectricRotor { .. } | ContributorKind::FuelCellStack { .. }
        )
    }
}
