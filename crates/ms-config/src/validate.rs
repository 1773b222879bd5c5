//! Mission validation logic.

use crate::schema::{ContributorKind, MissionDef, NumericsDef, ProfileDef, SegmentDef};
use std::collections::{HashMap, HashSet};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Missing field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Conflicting fields: {fields} in {context}")]
    Conflict { fields: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing atmosphere: {context} needs a StandardAtmosphere contributor ahead of it")]
    MissingAtmosphere { context: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_mission(mission: &MissionDef) -> Result<(), ValidationError> {
    if mission.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: mission.version,
        });
    }

    let mut tags = HashSet::new();
    for (index, segment) in mission.segments.iter().enumerate() {
        if !tags.insert(&segment.tag) {
            return Err(ValidationError::DuplicateId {
                id: segment.tag.clone(),
                context: "segments".to_string(),
            });
        }
        validate_segment(segment, index == 0)?;
    }

    Ok(())
}

fn validate_segment(segment: &SegmentDef, first: bool) -> Result<(), ValidationError> {
    let context = format!("segment '{}'", segment.tag);
    validate_profile(&segment.profile, first, &context)?;
    validate_numerics(&segment.numerics, &context)?;

    // Contributors run in order, so references must point backwards.
    let mut seen: HashMap<&str, &ContributorKind> = HashMap::new();
    for contributor in &segment.contributors {
        if seen.contains_key(contributor.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: contributor.id.clone(),
                context: format!("{context} contributors"),
            });
        }
        let field = |name: &str| format!("{context} contributor '{}' {name}", contributor.id);
        if contributor.kind.needs_atmosphere() && !has_atmosphere(seen.values().copied()) {
            return Err(ValidationError::MissingAtmosphere {
                context: format!("{context} contributor '{}'", contributor.id),
            });
        }

        match &contributor.kind {
            ContributorKind::StandardAtmosphere {
                temperature_offset_k,
            } => finite(*temperature_offset_k, &field("temperature_offset_k"))?,
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
            } => {
                positive(*kv_radps_per_v, &field("kv_radps_per_v"))?;
                positive(*resistance_ohm, &field("resistance_ohm"))?;
                non_negative(*no_load_current_a, &field("no_load_current_a"))?;
                positive(*diameter_m, &field("diameter_m"))?;
                positive(*thrust_coefficient, &field("thrust_coefficient"))?;
                positive(*torque_coefficient, &field("torque_coefficient"))?;
                positive(*voltage_v, &field("voltage_v"))?;
                finite(*initial_speed_radps, &field("initial_speed_radps"))?;
                if !(0.0..=1.0).contains(throttle) {
                    return Err(ValidationError::InvalidValue {
                        field: field("throttle"),
                        value: throttle.to_string(),
                        reason: "must be in [0, 1]".to_string(),
                    });
                }
            }
            ContributorKind::ElectricBus { voltage_v, loads } => {
                positive(*voltage_v, &field("voltage_v"))?;
                for load in loads {
                    match seen.get(load.as_str()) {
                        Some(kind) if kind.is_electric_load() => {}
                        _ => {
                            return Err(ValidationError::MissingReference {
                                id: load.clone(),
                                context: field("loads"),
                            });
                        }
                    }
                }
            }
            ContributorKind::FuelCellStack {
                bus,
                number_of_stacks,
                cells_per_stack,
                cell_area_m2,
                open_circuit_voltage_v,
                area_specific_resistance_ohm_m2,
                initial_current_density_a_per_m2,
            } => {
                if !matches!(seen.get(bus.as_str()), Some(ContributorKind::ElectricBus { .. })) {
                    return Err(ValidationError::MissingReference {
                        id: bus.clone(),
                        context: field("bus"),
                    });
                }
                at_least_one(*number_of_stacks, &field("number_of_stacks"))?;
                at_least_one(*cells_per_stack, &field("cells_per_stack"))?;
                positive(*cell_area_m2, &field("cell_area_m2"))?;
                positive(*open_circuit_voltage_v, &field("open_circuit_voltage_v"))?;
                positive(
                    *area_specific_resistance_ohm_m2,
                    &field("area_specific_resistance_ohm_m2"),
                )?;
                positive(
                    *initial_current_density_a_per_m2,
                    &field("initial_current_density_a_per_m2"),
                )?;
            }
            ContributorKind::CoolingLoop {
                sources,
                conductance_w_per_k,
                initial_temperature_k,
                ambient_temperature_k,
            } => {
                positive(*conductance_w_per_k, &field("conductance_w_per_k"))?;
                positive(*initial_temperature_k, &field("initial_temperature_k"))?;
                if let Some(t) = ambient_temperature_k {
                    positive(*t, &field("ambient_temperature_k"))?;
                }
                for source in sources {
                    match seen.get(source.as_str()) {
                        Some(kind) if kind.is_heat_source() => {}
                        _ => {
                            return Err(ValidationError::MissingReference {
                                id: source.clone(),
                                context: field("sources"),
                            });
                        }
                    }
                }
            }
            ContributorKind::ConstantMassFlow { rate_kgps } => {
                non_negative(*rate_kgps, &field("rate_kgps"))?;
            }
            ContributorKind::ParasiteDrag {
                reference_area_m2,
                drag_coefficient,
            } => {
                positive(*reference_area_m2, &field("reference_area_m2"))?;
                positive(*drag_coefficient, &field("drag_coefficient"))?;
            }
        }

        seen.insert(contributor.id.as_str(), &contributor.kind);
    }

    if segment.profile.mach_number.is_some()
        && !has_atmosphere(segment.contributors.iter().map(|c| &c.kind))
    {
        return Err(ValidationError::MissingAtmosphere {
            context: format!("{context} constant-Mach profile"),
        });
    }

    Ok(())
}

fn has_atmosphere<'a>(mut kinds: impl Iterator<Item = &'a ContributorKind>) -> bool {
    kinds.any(|kind| matches!(kind, ContributorKind::StandardAtmosphere { .. }))
}

fn validate_profile(profile: &ProfileDef, first: bool, context: &str) -> Result<(), ValidationError> {
    match (profile.duration_s, profile.distance_m) {
        (Some(_), Some(_)) => {
            return Err(ValidationError::Conflict {
                fields: "duration_s, distance_m".to_string(),
                context: format!("{context} profile"),
            });
        }
        (None, None) => {
            return Err(ValidationError::MissingField {
                field: "duration_s or distance_m".to_string(),
                context: format!("{context} profile"),
            });
        }
        (Some(t), None) => positive(t, &format!("{context} duration_s"))?,
        (None, Some(d)) => {
            positive(d, &format!("{context} distance_m"))?;
            if profile.mach_number.is_none() {
                positive(profile.speed_mps, &format!("{context} speed_mps"))?;
            }
        }
    }

    match (profile.mach_number, profile.speed_end_mps) {
        (Some(_), Some(_)) => {
            return Err(ValidationError::Conflict {
                fields: "mach_number, speed_end_mps".to_string(),
                context: format!("{context} profile"),
            });
        }
        (Some(mach), None) => {
            positive(mach, &format!("{context} mach_number"))?;
            if profile.distance_m.is_none() {
                return Err(ValidationError::MissingField {
                    field: "distance_m".to_string(),
                    context: format!("{context} constant-Mach profile"),
                });
            }
            if profile.speed_mps != 0.0 {
                return Err(ValidationError::Conflict {
                    fields: "speed_mps, mach_number".to_string(),
                    context: format!("{context} profile"),
                });
            }
        }
        (None, Some(speed_end)) => {
            positive(speed_end, &format!("{context} speed_end_mps"))?;
            non_negative(profile.speed_mps, &format!("{context} speed_mps"))?;
            if profile.duration_s.is_none() {
                return Err(ValidationError::MissingField {
                    field: "duration_s (elapsed time guess)".to_string(),
                    context: format!("{context} accelerating profile"),
                });
            }
            if profile.climb_rate_mps != 0.0 {
                return Err(ValidationError::Conflict {
                    fields: "climb_rate_mps, speed_end_mps".to_string(),
                    context: format!("{context} profile"),
                });
            }
            if speed_end == profile.speed_mps {
                return Err(ValidationError::InvalidValue {
                    field: format!("{context} speed_end_mps"),
                    value: speed_end.to_string(),
                    reason: "must differ from speed_mps".to_string(),
                });
            }
        }
        (None, None) => {}
    }

    finite(profile.speed_mps, &format!("{context} speed_mps"))?;
    finite(profile.climb_rate_mps, &format!("{context} climb_rate_mps"))?;
    if let Some(h) = profile.altitude_m {
        finite(h, &format!("{context} altitude_m"))?;
    }
    if let Some(m) = profile.initial_mass_kg {
        positive(m, &format!("{context} initial_mass_kg"))?;
    }

    if first {
        if profile.altitude_m.is_none() {
            return Err(ValidationError::MissingField {
                field: "altitude_m".to_string(),
                context: format!("{context} profile (first segment)"),
            });
        }
        if profile.initial_mass_kg.is_none() {
            return Err(ValidationError::MissingField {
                field: "initial_mass_kg".to_string(),
                context: format!("{context} profile (first segment)"),
            });
        }
    }
    Ok(())
}

fn validate_numerics(numerics: &NumericsDef, context: &str) -> Result<(), ValidationError> {
    if numerics.number_of_control_points < 2 {
        return Err(ValidationError::InvalidValue {
            field: format!("{context} number_of_control_points"),
            value: numerics.number_of_control_points.to_string(),
            reason: "must be at least 2".to_string(),
        });
    }
    positive(numerics.tolerance_solution, &format!("{context} tolerance_solution"))?;
    if let Some(step) = numerics.step_size {
        non_negative(step, &format!("{context} step_size"))?;
    }
    Ok(())
}

fn finite(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        })
    }
}

fn positive(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        })
    }
}

fn non_negative(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        })
    }
}

fn at_least_one(value: usize, field: &str) -> Result<(), ValidationError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        })
    }
}
