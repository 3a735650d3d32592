// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Inner join of the coordinate and voltage tables.

use serde::Serialize;

use crate::measurement::{CoordinateTable, VoltageTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedSample {
    #[serde(rename = "Node")]
    pub label: String,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Voltage")]
    pub voltage: f64,
}

/// Labels that did not make it into the merged set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub coordinate_only: Vec<String>,
    pub voltage_only: Vec<String>,
    /// Present in both tables but with an undefined X, Y or voltage.
    pub undefined: Vec<String>,
}

impl MergeReport {
    pub fn unmatched_count(&self) -> usize {
        self.coordinate_only.len() + self.voltage_only.len() + self.undefined.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeResult {
    /// Ascending label order.
    pub samples: Vec<MergedSample>,
    pub report: MergeReport,
}

impl MergeResult {
    pub fn voltages(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.voltage)
    }

    /// Measured voltage range, `None` when nothing merged.
    pub fn voltage_range(&self) -> Option<(f64, f64)> {
        self.voltages().fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Pair every label present in both tables. An empty result is not an error.
pub fn merge(coordinates: &CoordinateTable, voltages: &VoltageTable) -> MergeResult {
    let mut samples = Vec::new();
    let mut report = MergeReport::default();

    for coordinate in coordinates {
        let Some(voltage) = voltages.get(&coordinate.label) else {
            report.coordinate_only.push(coordinate.label.clone());
            continue;
        };
        match (coordinate.x, coordinate.y, voltage.voltage) {
            (Some(x), Some(y), Some(v)) => samples.push(MergedSample {
                label: coordinate.label.clone(),
                x,
                y,
                voltage: v,
            }),
            _ => report.undefined.push(coordinate.label.clone()),
        }
    }

    report.voltage_only = voltages
        .iter()
        .filter(|v| !coordinates.contains(&v.label))
        .map(|v| v.label.clone())
        .collect();

    samples.sort_by(|a, b| a.label.cmp(&b.label));
    report.coordinate_only.sort();
    report.voltage_only.sort();
    report.undefined.sort();

    log::info!(
        "[INFO] Merged {} samples ({} coordinate-only, {} voltage-only, {} undefined)",
        samples.len(),
        report.coordinate_only.len(),
        report.voltage_only.len(),
        report.undefined.len()
    );

    MergeResult { samples, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::parser::{parse_coordinates, parse_voltages};

    #[test]
    fn test_inner_join_reports_unmatched() {
        let coords = parse_coordinates("a 0 0\nb 1 0\nc 0 1\n");
        let volts = parse_voltages("B 2.0\nA 1.0\nZ 9.0\n");
        let result = merge(&coords, &volts);

        let labels: Vec<&str> = result.samples.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(result.report.coordinate_only, vec!["C"]);
        assert_eq!(result.report.voltage_only, vec!["Z"]);
        assert_eq!(result.voltage_range(), Some((1.0, 2.0)));
    }

    #[test]
    fn test_undefined_values_are_excluded() {
        let coords = parse_coordinates("a 0 zero\nb 1 0\n");
        let volts = parse_voltages("a 1.0\nb high\n");
        let result = merge(&coords, &volts);
        assert!(result.samples.is_empty());
        assert_eq!(result.report.undefined, vec!["A", "B"]);
        assert_eq!(result.voltage_range(), None);
    }
}
