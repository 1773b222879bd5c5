//! Named unknowns/residuals registry.
//!
//! A registry holds named, fixed-length numeric entries. Declaration order is
//! the flattening order used by [`Registry::pack`] and [`Registry::unpack`],
//! so `pack(unpack(v)) == v` for any vector of the right length.
//!
//! Once a segment has finished registering, the registry is sealed: entries
//! may still be overwritten but no new names can be added.

use crate::error::{SolverError, SolverResult};
use nalgebra::DVector;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    name: String,
    values: Vec<f64>,
}

/// Ordered collection of named numeric entries.
#[derive(Clone, Debug)]
pub struct Registry {
    label: &'static str,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    sealed: bool,
}

impl Registry {
    /// Create an empty registry; `label` appears in error messages.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Vec::new(),
            index: HashMap::new(),
            sealed: false,
        }
    }

    pub fn unknowns() -> Self {
        Self::new("unknowns")
    }

    pub fn residuals() -> Self {
        Self::new("residuals")
    }

    /// Register a new entry with its initial values.
    ///
    /// # Errors
    /// Duplicate names, empty entries and declarations into a sealed registry
    /// are configuration errors.
    pub fn declare(&mut self, name: impl Into<String>, initial: Vec<f64>) -> SolverResult<()> {
        let name = name.into();
        if self.sealed {
            return Err(SolverError::Configuration {
                what: format!(
                    "{} registry is sealed; cannot declare '{}'",
                    self.label, name
                ),
            });
        }
        if self.index.contains_key(&name) {
            return Err(SolverError::Configuration {
                what: format!("{} entry '{}' declared twice", self.label, name),
            });
        }
        if initial.is_empty() {
            return Err(SolverError::Configuration {
                what: format!("{} entry '{}' has no values", self.label, name),
            });
        }

        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(Entry {
            name,
            values: initial,
        });
        Ok(())
    }

    /// Overwrite the values of an existing entry.
    pub fn set(&mut self, name: &str, values: &[f64]) -> SolverResult<()> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| SolverError::Configuration {
                what: format!("{} entry '{}' was never declared", self.label, name),
            })?;
        let entry = &mut self.entries[idx];
        if entry.values.len() != values.len() {
            return Err(SolverError::Configuration {
                what: format!(
                    "{} entry '{}' has length {}, got {} values",
                    self.label,
                    name,
                    entry.values.len(),
                    values.len()
                ),
            });
        }
        entry.values.copy_from_slice(values);
        Ok(())
    }

    /// Declare an entry while the registry is open, overwrite it once sealed.
    ///
    /// Residuals are written this way on every iteration and declared by the
    /// first pass, so a name written twice before sealing is a duplicate
    /// declaration.
    pub fn upsert(&mut self, name: &str, values: &[f64]) -> SolverResult<()> {
        if self.sealed {
            self.set(name, values)
        } else {
            self.declare(name, values.to_vec())
        }
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.index
            .get(name)
            .map(|&idx| self.entries[idx].values.as_slice())
    }

    /// Like [`Registry::get`], but a missing entry is an error.
    pub fn require(&self, name: &str) -> SolverResult<&[f64]> {
        self.get(name).ok_or_else(|| SolverError::Configuration {
            what: format!("{} entry '{}' was never declared", self.label, name),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Freeze the set of names.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of scalars across all entries.
    pub fn total_len(&self) -> usize {
        self.entries.iter().map(|e| e.values.len()).sum()
    }

    /// Entry names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Concatenate all entries in declaration order.
    pub fn pack(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.total_len(),
            self.entries.iter().flat_map(|e| e.values.iter().copied()),
        )
    }

    /// Scatter a flat vector back into the named entries.
    ///
    /// # Errors
    /// Returns `Configuration` if `flat` does not match [`Registry::total_len`].
    pub fn unpack(&mut self, flat: &[f64]) -> SolverResult<()> {
        let expected = self.total_len();
        if flat.len() != expected {
            return Err(SolverError::Configuration {
                what: format!(
                    "{} vector has length {}, expected {}",
                    self.label,
                    flat.len(),
                    expected
                ),
            });
        }

        let mut offset = 0;
        for entry in &mut self.entries {
            let n = entry.values.len();
            entry.values.copy_from_slice(&flat[offset..offset + n]);
            offset += n;
        }
        Ok(())
    }

    /// Name of the first entry holding a NaN or infinite value.
    pub fn first_non_finite(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| ms_core::first_non_finite(&e.values).is_some())
            .map(|e| e.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Registry {
        let mut reg = Registry::unknowns();
        reg.declare("rotor_speed", vec![300.0; 4]).unwrap();
        reg.declare("current_density", vec![5000.0; 4]).unwrap();
        reg.declare("trim", vec![0.1]).unwrap();
        reg
    }

    #[test]
    fn pack_follows_declaration_order() {
        let reg = sample();
        let flat = reg.pack();
        assert_eq!(flat.len(), 9);
        assert_eq!(flat[0], 300.0);
        assert_eq!(flat[4], 5000.0);
        assert_eq!(flat[8], 0.1);
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(names, vec!["rotor_speed", "current_density", "trim"]);
    }

    #[test]
    fn unpack_scatters_into_entries() {
        let mut reg = sample();
        let flat: Vec<f64> = (0..9).map(|i| i as f64).collect();
        reg.unpack(&flat).unwrap();
        assert_eq!(reg.get("rotor_speed").unwrap(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(reg.get("current_density").unwrap(), &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(reg.get("trim").unwrap(), &[8.0]);
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        let mut reg = sample();
        let err = reg.unpack(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, SolverError::Configuration { .. }));
        assert!(err.to_string().contains("expected 9"));
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let mut reg = sample();
        let err = reg.declare("trim", vec![0.0]).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn sealed_registry_accepts_overwrites_only() {
        let mut reg = Registry::residuals();
        reg.upsert("torque", &[0.0, 0.0]).unwrap();
        reg.seal();
        reg.upsert("torque", &[1.0, 2.0]).unwrap();
        assert_eq!(reg.get("torque").unwrap(), &[1.0, 2.0]);
        assert!(reg.upsert("power", &[0.0]).is_err());
        assert!(reg.set("torque", &[1.0]).is_err());
    }

    #[test]
    fn open_registry_rejects_a_second_upsert() {
        let mut reg = Registry::residuals();
        reg.upsert("balance", &[1.0]).unwrap();
        let err = reg.upsert("balance", &[2.0]).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
        assert_eq!(reg.get("balance").unwrap(), &[1.0]);
    }

    #[test]
    fn first_non_finite_names_the_entry() {
        let mut reg = sample();
        assert_eq!(reg.first_non_finite(), None);
        reg.set("current_density", &[1.0, f64::NAN, 1.0, 1.0])
            .unwrap();
        assert_eq!(reg.first_non_finite(), Some("current_density"));
    }
}
