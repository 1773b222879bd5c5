//! Per-segment state over all control points.
//!
//! Quantities are addressed by dotted paths (`frames.inertial.time`,
//! `energy.rotor.rotor_speed`); the dots form the hierarchy, so a
//! contributor's subtree is every path below `energy.<tag>`. Each entry is an
//! `n_points x columns` matrix: one row per control point, one column per
//! vector component (three for spatial vectors, one for scalars).

use crate::error::{MissionError, MissionResult};
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;

/// Well-known condition paths written by the segment itself.
pub mod paths {
    pub const TIME: &str = "frames.inertial.time";
    pub const POSITION: &str = "frames.inertial.position_vector";
    pub const VELOCITY: &str = "frames.inertial.velocity_vector";
    pub const ACCELERATION: &str = "frames.inertial.acceleration_vector";
    pub const GRAVITY_FORCE: &str = "frames.inertial.gravity_force_vector";
    pub const TOTAL_FORCE: &str = "frames.inertial.total_force_vector";
    pub const RANGE: &str = "frames.inertial.aircraft_range";

    pub const TOTAL_MASS: &str = "weights.total_mass";
    pub const MASS_RATE: &str = "weights.vehicle_mass_rate";

    pub const ALTITUDE: &str = "freestream.altitude";
    pub const GRAVITY: &str = "freestream.gravity";
    pub const DENSITY: &str = "freestream.density";
    pub const TEMPERATURE: &str = "freestream.temperature";
    pub const PRESSURE: &str = "freestream.pressure";
    pub const SPEED_OF_SOUND: &str = "freestream.speed_of_sound";
    pub const AIRSPEED: &str = "freestream.velocity";

    /// Path of a quantity owned by the contributor tagged `tag`.
    pub fn energy(tag: &str, field: &str) -> String {
        format!("energy.{tag}.{field}")
    }
}

/// Hierarchical container of sampled quantities.
#[derive(Clone, Debug, PartialEq)]
pub struct Conditions {
    n_points: usize,
    entries: BTreeMap<String, DMatrix<f64>>,
}

impl Conditions {
    pub fn new(n_points: usize) -> Self {
        Self {
            n_points,
            entries: BTreeMap::new(),
        }
    }

    /// Number of control points (rows of every entry).
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Declare a zero-filled entry with `columns` components.
    ///
    /// Re-declaring a path with the same width is a no-op, so several
    /// contributors may share an entry such as `freestream.density`.
    pub fn declare(&mut self, path: &str, columns: usize) -> MissionResult<()> {
        if columns == 0 {
            return Err(MissionError::configuration(format!(
                "condition '{path}' must have at least one column"
            )));
        }
        match self.entries.get(path) {
            Some(existing) if existing.ncols() == columns => Ok(()),
            Some(existing) => Err(MissionError::configuration(format!(
                "condition '{path}' already declared with {} columns, requested {columns}",
                existing.ncols()
            ))),
            None => {
                self.entries
                    .insert(path.to_string(), DMatrix::zeros(self.n_points, columns));
                Ok(())
            }
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&DMatrix<f64>> {
        self.entries.get(path)
    }

    /// Like [`Conditions::get`], but a missing path is a configuration error.
    pub fn entry(&self, path: &str) -> MissionResult<&DMatrix<f64>> {
        self.entries.get(path).ok_or_else(|| missing(path))
    }

    pub fn entry_mut(&mut self, path: &str) -> MissionResult<&mut DMatrix<f64>> {
        self.entries.get_mut(path).ok_or_else(|| missing(path))
    }

    /// Copy of one component over all control points.
    pub fn column(&self, path: &str, col: usize) -> MissionResult<DVector<f64>> {
        let entry = self.entry(path)?;
        check_column(path, col, entry.ncols())?;
        Ok(entry.column(col).clone_owned())
    }

    /// First column of an entry; the whole entry for scalars.
    pub fn scalar(&self, path: &str) -> MissionResult<DVector<f64>> {
        self.column(path, 0)
    }

    pub fn set_column(&mut self, path: &str, col: usize, values: &DVector<f64>) -> MissionResult<()> {
        let n = self.n_points;
        let entry = self.entry_mut(path)?;
        check_column(path, col, entry.ncols())?;
        if values.len() != n {
            return Err(MissionError::configuration(format!(
                "condition '{path}' has {n} control points, got {} values",
                values.len()
            )));
        }
        entry.set_column(col, values);
        Ok(())
    }

    pub fn set_scalar(&mut self, path: &str, values: &DVector<f64>) -> MissionResult<()> {
        self.set_column(path, 0, values)
    }

    pub fn fill_column(&mut self, path: &str, col: usize, value: f64) -> MissionResult<()> {
        let entry = self.entry_mut(path)?;
        check_column(path, col, entry.ncols())?;
        entry.column_mut(col).fill(value);
        Ok(())
    }

    /// Overwrite the first control point of an entry.
    pub fn set_initial(&mut self, path: &str, values: &[f64]) -> MissionResult<()> {
        let entry = self.entry_mut(path)?;
        if values.len() != entry.ncols() {
            return Err(MissionError::configuration(format!(
                "condition '{path}' has {} columns, got {} initial values",
                entry.ncols(),
                values.len()
            )));
        }
        for (col, v) in values.iter().enumerate() {
            entry[(0, col)] = *v;
        }
        Ok(())
    }

    /// Values at the final control point.
    pub fn last_row(&self, path: &str) -> MissionResult<Vec<f64>> {
        let entry = self.entry(path)?;
        Ok(last_row_of(entry))
    }

    /// All paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Final-control-point slice of every entry.
    pub fn terminal(&self) -> BTreeMap<String, Vec<f64>> {
        self.entries
            .iter()
            .map(|(path, value)| (path.clone(), last_row_of(value)))
            .collect()
    }
}

fn last_row_of(entry: &DMatrix<f64>) -> Vec<f64> {
    match entry.nrows() {
        0 => Vec::new(),
        rows => entry.row(rows - 1).iter().copied().collect(),
    }
}

fn missing(path: &str) -> MissionError {
    MissionError::configuration(format!("condition '{path}' was never declared"))
}

fn check_column(path: &str, col: usize, ncols: usize) -> MissionResult<()> {
    if col >= ncols {
        return Err(MissionError::configuration(format!(
            "condition '{path}' has {ncols} columns, column {col} requested"
        )));
    }
    Ok(())
}
