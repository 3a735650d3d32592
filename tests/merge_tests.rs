// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Test cases for the coordinate/voltage inner join

use irdrop_viewer::measurement::parser::{parse_coordinates, parse_voltages};
use irdrop_viewer::measurement::{normalize_label, CoordinateTable, NodeCoordinate, VoltageSample, VoltageTable};
use irdrop_viewer::merge;
use proptest::prelude::*;

#[test]
fn test_case_insensitive_join() {
    let coords = parse_coordinates("n1 3 4\n");
    let volts = parse_voltages("N1 0.9\n");
    let result = merge(&coords, &volts);
    assert_eq!(result.samples.len(), 1);
    let sample = &result.samples[0];
    assert_eq!((sample.x, sample.y, sample.voltage), (3.0, 4.0, 0.9));
}

#[test]
fn test_voltage_only_label_is_dropped_silently() {
    let coords = parse_coordinates("A 0 0\nB 10 0\nC 0 10\n");
    let volts = parse_voltages("A 1.0\nB 2.0\nC 3.0\nGHOST 9.9\n");
    let result = merge(&coords, &volts);
    assert_eq!(result.samples.len(), 3);
    assert!(result.samples.iter().all(|s| s.label != "GHOST"));
    assert_eq!(result.report.voltage_only, vec!["GHOST"]);
}

#[test]
fn test_no_overlap_is_not_an_error() {
    let coords = parse_coordinates("A 0 0\n");
    let volts = parse_voltages("B 1.0\n");
    let result = merge(&coords, &volts);
    assert!(result.samples.is_empty());
    assert_eq!(result.report.unmatched_count(), 2);
}

fn tables() -> impl Strategy<Value = (CoordinateTable, VoltageTable)> {
    let coords = prop::collection::vec(("[a-fA-F][0-9]", -100.0f64..100.0, -100.0f64..100.0), 0..20);
    let volts = prop::collection::vec(("[a-fA-F][0-9]", 0.0f64..2.0), 0..20);
    (coords, volts).prop_map(|(coords, volts)| {
        let coords = coords
            .into_iter()
            .map(|(label, x, y)| NodeCoordinate {
                label: normalize_label(&label),
                x: Some(x),
                y: Some(y),
                layer: None,
            })
            .collect();
        let volts = volts
            .into_iter()
            .map(|(label, v)| VoltageSample {
                label: normalize_label(&label),
                voltage: Some(v),
            })
            .collect();
        (coords, volts)
    })
}

proptest! {
    #[test]
    fn merge_is_an_inner_join((coords, volts) in tables()) {
        let result = merge(&coords, &volts);
        prop_assert!(result.samples.len() <= coords.len().min(volts.len()));

        for sample in &result.samples {
            let c = coords.get(&sample.label).unwrap();
            let v = volts.get(&sample.label).unwrap();
            prop_assert_eq!(Some(sample.x), c.x);
            prop_assert_eq!(Some(sample.y), c.y);
            prop_assert_eq!(Some(sample.voltage), v.voltage);
        }

        let expected = coords.iter().filter(|c| volts.contains(&c.label)).count();
        prop_assert_eq!(result.samples.len(), expected);
    }

    #[test]
    fn merge_output_is_sorted_by_label((coords, volts) in tables()) {
        let result = merge(&coords, &volts);
        for pair in result.samples.windows(2) {
            prop_assert!(pair[0].label < pair[1].label);
        }
    }
}
