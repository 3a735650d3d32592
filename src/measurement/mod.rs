// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Node coordinate and node voltage tables.
//!
//! Both tables are plain text, one whitespace-separated record per line:
//!
//! ```text
//! LABEL X Y [LAYER]      coordinate table
//! LABEL VOLTAGE [...]    voltage table
//! ```
//!
//! Labels are case-insensitive and stored uppercase. Numeric fields that do not
//! parse are kept as `None` instead of failing the load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod parser;
pub mod reader;

/// Uppercase form used as the join key between the two tables.
pub fn normalize_label(label: &str) -> String {
    label.to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCoordinate {
    pub label: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub layer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageSample {
    pub label: String,
    pub voltage: Option<f64>,
}

/// Records that carry a normalized label.
pub trait Labeled {
    fn label(&self) -> &str;
}

impl Labeled for NodeCoordinate {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Labeled for VoltageSample {
    fn label(&self) -> &str {
        &self.label
    }
}

/// Label-keyed records in order of first appearance.
///
/// A record whose label was already seen replaces the earlier one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable<T> {
    records: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Labeled> LabelTable<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, record: T) -> Option<T> {
        match self.index.get(record.label()) {
            Some(&slot) => Some(std::mem::replace(&mut self.records[slot], record)),
            None => {
                self.index
                    .insert(record.label().to_string(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&T> {
        self.index
            .get(&normalize_label(label))
            .map(|&slot| &self.records[slot])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }
}

impl<T: Labeled> Default for LabelTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Labeled> FromIterator<T> for LabelTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

impl<'a, T> IntoIterator for &'a LabelTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

pub type CoordinateTable = LabelTable<NodeCoordinate>;
pub type VoltageTable = LabelTable<VoltageSample>;

#[cfg(test)]
mod tests {
    use super::*;

    fn voltage(label: &str, v: f64) -> VoltageSample {
        VoltageSample {
            label: normalize_label(label),
            voltage: Some(v),
        }
    }

    #[test]
    fn test_last_write_wins_keeps_first_position() {
        let table: VoltageTable = vec![voltage("a", 1.0), voltage("b", 2.0), voltage("A", 3.0)]
            .into_iter()
            .collect();
        let labels: Vec<&str> = table.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(table.get("a").unwrap().voltage, Some(3.0));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_label("vdd_n1");
        assert_eq!(once, "VDD_N1");
        assert_eq!(normalize_label(&once), once);
    }
}
