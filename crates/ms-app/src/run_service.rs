//! Mission execution service.

use std::path::Path;
use std::time::Instant;

use ms_config::MissionDef;
use ms_mission::{MissionReport, SegmentOutcome, SegmentStatus, paths};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::runtime_compile::compile_mission;

/// Summary of a mission run, suitable for writing next to the input file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub mission: String,
    /// RFC 3339 start time
    pub timestamp: String,
    pub wall_time_s: f64,
    pub all_converged: bool,
    pub segments: Vec<SegmentSummary>,
}

impl RunSummary {
    pub fn segment(&self, tag: &str) -> Option<&SegmentSummary> {
        self.segments.iter().find(|s| s.tag == tag)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SegmentSummary {
    pub tag: String,
    pub converged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub iterations: usize,
    pub evaluations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual_norm: Option<f64>,
    pub final_time_s: f64,
    pub final_range_m: f64,
    pub final_mass_kg: f64,
    pub final_altitude_m: f64,
}

/// Compile and fly a mission definition.
///
/// A segment whose root finder gives up is reported in the summary, not
/// returned as an error.
pub fn run_mission(def: &MissionDef) -> AppResult<RunSummary> {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let start = Instant::now();

    let mut mission = compile_mission(def)?;
    info!(
        mission = %def.name,
        segments = def.segments.len(),
        "starting mission run"
    );
    let report = mission.evaluate()?;
    let summary = summarize(&report, timestamp, start.elapsed().as_secs_f64());

    if summary.all_converged {
        info!(
            mission = %summary.mission,
            wall_time_s = summary.wall_time_s,
            "mission run complete"
        );
    } else {
        let failed: Vec<&str> = report.failed().collect();
        warn!(mission = %summary.mission, ?failed, "mission run finished with failed segments");
    }
    Ok(summary)
}

/// Load a mission file (YAML or JSON by extension) and run it.
pub fn run_mission_file(path: &Path) -> AppResult<RunSummary> {
    let def = load_mission(path)?;
    run_mission(&def)
}

pub fn load_mission(path: &Path) -> AppResult<MissionDef> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let def = match extension.as_deref() {
        Some("yaml") | Some("yml") => ms_config::load_yaml(path)?,
        Some("json") => ms_config::load_json(path)?,
        _ => {
            return Err(AppError::UnsupportedFile {
                path: path.to_path_buf(),
            });
        }
    };
    Ok(def)
}

pub fn save_summary(path: &Path, summary: &RunSummary) -> AppResult<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json).map_err(|source| AppError::SummaryWrite {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_summary(path: &Path) -> AppResult<RunSummary> {
    let content = std::fs::read_to_string(path).map_err(|source| AppError::SummaryRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn summarize(report: &MissionReport, timestamp: String, wall_time_s: f64) -> RunSummary {
    let segments = report
        .segments
        .iter()
        .map(|seg| {
            let terminal = &seg.terminal;
            let (iterations, evaluations, residual_norm, message) = match &seg.outcome {
                SegmentOutcome::Converged {
                    iterations,
                    evaluations,
                    residual_norm,
                } => (*iterations, *evaluations, Some(*residual_norm), None),
                SegmentOutcome::Failed { message } => (0, 0, None, Some(message.clone())),
            };
            SegmentSummary {
                tag: seg.tag.clone(),
                converged: terminal.status == SegmentStatus::Converged,
                message,
                iterations,
                evaluations,
                residual_norm,
                final_time_s: terminal.scalar(paths::TIME).unwrap_or(0.0),
                final_range_m: terminal.scalar(paths::RANGE).unwrap_or(0.0),
                final_mass_kg: terminal.scalar(paths::TOTAL_MASS).unwrap_or(0.0),
                final_altitude_m: terminal.position().map_or(0.0, |p| -p[2]),
            }
        })
        .collect();

    RunSummary {
        mission: report.tag.clone(),
        timestamp,
        wall_time_s,
        all_converged: report.all_converged(),
        segments,
    }
}
