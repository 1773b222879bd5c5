//! State handed from one segment to the next.

use crate::converge::SegmentStatus;
use crate::conditions::paths;
use crate::error::{MissionError, MissionResult};
use crate::profile::Profile;
use std::collections::BTreeMap;

/// Final-control-point slice of a solved segment.
#[derive(Clone, Debug, PartialEq)]
pub struct TerminalState {
    pub segment: String,
    pub status: SegmentStatus,
    pub values: BTreeMap<String, Vec<f64>>,
}

impl TerminalState {
    pub fn get(&self, path: &str) -> Option<&[f64]> {
        self.values.get(path).map(Vec::as_slice)
    }

    /// First component of a terminal value.
    pub fn scalar(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(|v| v.first().copied())
    }

    pub fn position(&self) -> Option<[f64; 3]> {
        match self.get(paths::POSITION)? {
            [x, y, z] => Some([*x, *y, *z]),
            _ => None,
        }
    }
}

/// Initial values of a segment at its first control point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Seam {
    pub time: f64,
    pub position: [f64; 3],
    pub range: f64,
    pub mass: f64,
}

/// Resolve the first-control-point state of a segment.
///
/// Time, horizontal position and range continue from `previous` (or start at
/// zero). A fixed altitude or mass in the profile overrides the inherited
/// value; the jump is taken by the first sample. A parameter that is neither
/// fixed nor inheritable is a configuration error naming it.
pub fn resolve_seam(profile: &Profile, previous: Option<&TerminalState>) -> MissionResult<Seam> {
    let (x, y, z_prev) = match previous.and_then(TerminalState::position) {
        Some([x, y, z]) => (x, y, Some(z)),
        None => (0.0, 0.0, None),
    };

    let z = match (profile.altitude, z_prev) {
        (Some(h), _) => -h.value,
        (None, Some(z)) => z,
        (None, None) => return Err(missing_parameter("altitude")),
    };

    let mass = match (profile.initial_mass, previous.and_then(|p| p.scalar(paths::TOTAL_MASS))) {
        (Some(m), _) => m.value,
        (None, Some(m)) => m,
        (None, None) => return Err(missing_parameter("initial_mass")),
    };

    Ok(Seam {
        time: previous.and_then(|p| p.scalar(paths::TIME)).unwrap_or(0.0),
        position: [x, y, z],
        range: previous.and_then(|p| p.scalar(paths::RANGE)).unwrap_or(0.0),
        mass,
    })
}

fn missing_parameter(name: &str) -> MissionError {
    MissionError::configuration(format!(
        "boundary parameter '{name}' is not set and there is no previous segment to inherit it from"
    ))
}
