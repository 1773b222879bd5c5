//! Mission definition to runtime compilation.
//!
//! Contributor kinds are resolved here, once per segment, into boxed
//! [`Contributor`]s; nothing is looked up by name during the solve.

use ms_components::{
    CellParameters, ComponentError, ConstantMassFlow, CoolingLoop, ElectricBus, ElectricRotor,
    FuelCellStack, Motor, ParasiteDrag, Rotor, StandardAtmosphere,
};
use ms_config::schema::{
    ContinuityDef, ContributorDef, ContributorKind, DifferencingDef, MissionDef, NumericsDef,
    ProfileDef, RootFinderDef, SegmentDef,
};
use ms_core::units::{k, kg, kgps, m, m2, mps, ohms, radps, s, volts};
use ms_mission::{
    ContinuityPolicy, Contributor, Extent, Mission, Motion, Numerics, Profile, Segment,
};
use ms_solver::{Differencing, QuasiNewton, RootFinder};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Validate a definition and build the runtime mission.
pub fn compile_mission(def: &MissionDef) -> AppResult<Mission> {
    ms_config::validate_mission(def)?;

    let continuity = match def.continuity {
        ContinuityDef::Permissive => ContinuityPolicy::Permissive,
        ContinuityDef::Strict => ContinuityPolicy::Strict,
    };
    let mut mission = Mission::new(def.name.clone()).with_continuity(continuity);
    for segment in &def.segments {
        mission.push(build_segment(segment)?);
    }
    Ok(mission)
}

pub fn build_segment(def: &SegmentDef) -> AppResult<Segment> {
    let mut segment = Segment::new(def.tag.clone(), build_profile(&def.profile)?)
        .with_numerics(build_numerics(&def.numerics))
        .with_root_finder(build_root_finder(&def.numerics));
    for contributor in &def.contributors {
        segment.push_contributor(build_contributor(contributor)?);
    }
    debug!(
        segment = %def.tag,
        contributors = def.contributors.len(),
        "compiled segment"
    );
    Ok(segment)
}

pub fn build_profile(def: &ProfileDef) -> AppResult<Profile> {
    let extent = match (def.duration_s, def.distance_m) {
        (Some(t), None) => Extent::Duration(s(t)),
        (None, Some(d)) => Extent::Distance(m(d)),
        _ => {
            return Err(AppError::Validation(
                "exactly one of duration_s and distance_m must be set".to_string(),
            ));
        }
    };

    let mut profile =
        Profile::new(extent, mps(def.speed_mps)).with_climb_rate(mps(def.climb_rate_mps));
    profile.motion = match (def.mach_number, def.speed_end_mps) {
        (None, None) => Motion::Steady,
        (Some(mach), None) => Motion::ConstantMach { mach },
        (None, Some(v)) => Motion::Accelerating { speed_end: mps(v) },
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "mach_number and speed_end_mps are mutually exclusive".to_string(),
            ));
        }
    };
    if let Some(h) = def.altitude_m {
        profile = profile.with_altitude(m(h));
    }
    if let Some(mass) = def.initial_mass_kg {
        profile = profile.with_initial_mass(kg(mass));
    }
    Ok(profile)
}

pub fn build_numerics(def: &NumericsDef) -> Numerics {
    Numerics {
        number_of_control_points: def.number_of_control_points,
        tolerance_solution: def.tolerance_solution,
        max_evaluations: def.max_evaluations,
        step_size: def.step_size,
        parallel_jacobian: def.parallel_jacobian,
    }
}

pub fn build_root_finder(def: &NumericsDef) -> Box<dyn RootFinder> {
    let mut solver = match def.root_finder {
        RootFinderDef::QuasiNewton => QuasiNewton::default(),
        RootFinderDef::Newton => QuasiNewton::newton(),
    };
    solver.differencing = match def.differencing {
        DifferencingDef::Forward => Differencing::Forward,
        DifferencingDef::Central => Differencing::Central,
    };
    Box::new(solver)
}

pub fn build_contributor(def: &ContributorDef) -> AppResult<Box<dyn Contributor>> {
    let component_error = |e: ComponentError| AppError::Component {
        id: def.id.clone(),
        message: e.to_string(),
    };

    let contributor: Box<dyn Contributor> = match &def.kind {
        ContributorKind::StandardAtmosphere {
            temperature_offset_k,
        } => Box::new(
            StandardAtmosphere::new(def.id.clone()).with_temperature_offset(*temperature_offset_k),
        ),
        ContributorKind::ElectricRotor {
            kv_radps_per_v,
            resistance_ohm,
            no_load_current_a,
            diameter_m,
            thrust_coefficient,
            torque_coefficient,
            voltage_v,
            throttle,
            initial_speed_radps,
        } => Box::new(
            ElectricRotor::new(
                def.id.clone(),
                Motor {
                    kv: *kv_radps_per_v,
                    resistance: ohms(*resistance_ohm),
                    no_load_current: *no_load_current_a,
                },
                Rotor {
                    diameter: m(*diameter_m),
                    thrust_coefficient: *thrust_coefficient,
                    torque_coefficient: *torque_coefficient,
                },
                volts(*voltage_v),
                *throttle,
                radps(*initial_speed_radps),
            )
            .map_err(component_error)?,
        ),
        ContributorKind::ElectricBus { voltage_v, loads } => Box::new(
            ElectricBus::new(def.id.clone(), volts(*voltage_v), loads.clone())
                .map_err(component_error)?,
        ),
        ContributorKind::FuelCellStack {
            bus,
            number_of_stacks,
            cells_per_stack,
            cell_area_m2,
            open_circuit_voltage_v,
            area_specific_resistance_ohm_m2,
            initial_current_density_a_per_m2,
        } => Box::new(
            FuelCellStack::new(
                def.id.clone(),
                bus.clone(),
                *number_of_stacks,
                CellParameters {
                    cells_per_stack: *cells_per_stack,
                    cell_area: m2(*cell_area_m2),
                    open_circuit_voltage: *open_circuit_voltage_v,
                    area_specific_resistance: *area_specific_resistance_ohm_m2,
                },
                *initial_current_density_a_per_m2,
            )
            .map_err(component_error)?,
        ),
        ContributorKind::CoolingLoop {
            sources,
            conductance_w_per_k,
            initial_temperature_k,
            ambient_temperature_k,
        } => {
            let mut cooling = CoolingLoop::new(
                def.id.clone(),
                sources.clone(),
                *conductance_w_per_k,
                k(*initial_temperature_k),
            )
            .map_err(component_error)?;
            if let Some(t) = ambient_temperature_k {
                cooling = cooling.with_ambient(k(*t));
            }
            Box::new(cooling)
        }
        ContributorKind::ConstantMassFlow { rate_kgps } => Box::new(
            ConstantMassFlow::new(def.id.clone(), kgps(*rate_kgps)).map_err(component_error)?,
        ),
        ContributorKind::ParasiteDrag {
            reference_area_m2,
            drag_coefficient,
        } => Box::new(
            ParasiteDrag::new(def.id.clone(), m2(*reference_area_m2), *drag_coefficient)
                .map_err(component_error)?,
        ),
    };
    Ok(contributor)
}
