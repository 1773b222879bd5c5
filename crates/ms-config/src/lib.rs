//! ms-config: mission file format and validation.

pub mod migrate;
pub mod schema;
pub mod validate;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_mission};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse, migrate and validate a YAML mission.
pub fn from_yaml_str(content: &str) -> ConfigResult<MissionDef> {
    let mission: MissionDef = serde_yaml::from_str(content)?;
    finish_load(mission)
}

pub fn from_json_str(content: &str) -> ConfigResult<MissionDef> {
    let mission: MissionDef = serde_json::from_str(content)?;
    finish_load(mission)
}

fn finish_load(mission: MissionDef) -> ConfigResult<MissionDef> {
    let mission = migrate_to_latest(mission)?;
    validate_mission(&mission)?;
    Ok(mission)
}

pub fn load_yaml(path: &std::path::Path) -> ConfigResult<MissionDef> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &std::path::Path, mission: &MissionDef) -> ConfigResult<()> {
    validate_mission(mission)?;
    let content = serde_yaml::to_string(mission)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ConfigResult<MissionDef> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

pub fn save_json(path: &std::path::Path, mission: &MissionDef) -> ConfigResult<()> {
    validate_mission(mission)?;
    let content = serde_json::to_string_pretty(mission)?;
    std::fs::write(path, content)?;
    Ok(())
}
