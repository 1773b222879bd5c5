//! Schema migration framework.

use crate::ConfigError;
use crate::schema::MissionDef;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut mission: MissionDef) -> Result<MissionDef, ConfigError> {
    while mission.version < LATEST_VERSION {
        mission = migrate_one_version(mission)?;
    }
    Ok(mission)
}

fn migrate_one_version(mission: MissionDef) -> Result<MissionDef, ConfigError> {
    match mission.version {
        0 => migrate_v0_to_v1(mission),
        v => Err(ConfigError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 files had no per-segment mass; every segment restarted from the
/// mission's first mass. Version 1 inherits it, so pin the first segment's
/// mass on every later segment that left it unset.
fn migrate_v0_to_v1(mut mission: MissionDef) -> Result<MissionDef, ConfigError> {
    let first_mass = mission
        .segments
        .first()
        .and_then(|s| s.profile.initial_mass_kg);
    if let Some(mass) = first_mass {
        for segment in mission.segments.iter_mut().skip(1) {
            segment.profile.initial_mass_kg.get_or_insert(mass);
        }
    }
    mission.version = 1;
    Ok(mission)
}
