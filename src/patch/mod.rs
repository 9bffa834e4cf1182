//! Flat parameter snapshots.
//!
//! A [`Patch`] is what a host persists: an ordered list of stable parameter
//! names and scalar values. Unknown names are skipped on load so older or
//! newer patches still apply.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::synth::controls::{Controls, ParamId};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub name: String,
    pub values: Vec<(String, f32)>,
}

impl Patch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Snapshot every parameter of `controls`.
    pub fn capture(name: impl Into<String>, controls: &Controls) -> Self {
        let values = ParamId::ALL
            .iter()
            .map(|&id| (id.name().to_owned(), controls.get(id)))
            .collect();
        Self {
            name: name.into(),
            values,
        }
    }

    /// Push the stored values into `controls`. Returns how many were applied.
    pub fn apply(&self, controls: &Controls) -> usize {
        let mut applied = 0;
        for (name, value) in &self.values {
            if controls.set_by_name(name, *value) {
                applied += 1;
            } else {
                log::debug!("patch '{}': skipping unknown parameter '{name}'", self.name);
            }
        }
        applied
    }

    pub fn get(&self, id: ParamId) -> Option<f32> {
        self.values
            .iter()
            .find(|(name, _)| name == id.name())
            .map(|&(_, value)| value)
    }

    /// Insert or replace a value.
    pub fn set(&mut self, id: ParamId, value: f32) {
        let value = id.normalize(value);
        match self.values.iter_mut().find(|(name, _)| name == id.name()) {
            Some(entry) => entry.1 = value,
            None => self.values.push((id.name().to_owned(), value)),
        }
    }
}
