// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use nom::{combinator::all_consuming, number::complete::double, IResult, Parser};

use super::{
    normalize_label, CoordinateTable, LabelTable, NodeCoordinate, VoltageSample, VoltageTable,
};

/// Widest accepted coordinate record: `LABEL X Y LAYER`.
const MAX_COORDINATE_FIELDS: usize = 4;

fn number(input: &str) -> IResult<&str, f64> {
    double(input)
}

/// Parse a whole field as a finite number; anything else is undefined.
pub fn parse_numeric_field(field: &str) -> Option<f64> {
    all_consuming(number)
        .parse(field)
        .ok()
        .map(|(_, value)| value)
        .filter(|value| value.is_finite())
}

/// Parse one coordinate line. Lines with fewer than 2 or more than 4 fields
/// are not coordinate records.
pub fn parse_coordinate_line(line: &str) -> Option<NodeCoordinate> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 2 || parts.len() > MAX_COORDINATE_FIELDS {
        return None;
    }

    Some(NodeCoordinate {
        label: normalize_label(parts[0]),
        x: parse_numeric_field(parts[1]),
        y: parts.get(2).and_then(|field| parse_numeric_field(field)),
        layer: parts.get(3).map(|field| field.to_string()),
    })
}

/// Parse one voltage line. Fields after the voltage are ignored.
pub fn parse_voltage_line(line: &str) -> Option<VoltageSample> {
    let mut parts = line.split_whitespace();
    let label = parts.next()?;
    let voltage = parts.next()?;

    Some(VoltageSample {
        label: normalize_label(label),
        voltage: parse_numeric_field(voltage),
    })
}

fn parse_table<T, F>(content: &str, kind: &str, parse_line: F) -> LabelTable<T>
where
    T: super::Labeled,
    F: Fn(&str) -> Option<T>,
{
    let mut table = LabelTable::new();
    let mut skipped = 0usize;
    let mut replaced = 0usize;

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(record) => {
                if table.insert(record).is_some() {
                    replaced += 1;
                }
            }
            None => {
                log::debug!("[DBG] Skipping {kind} line {}: {:?}", i + 1, line.trim());
                skipped += 1;
            }
        }
    }

    log::info!(
        "[INFO] Parsed {} {kind} records ({skipped} lines skipped, {replaced} duplicate labels replaced)",
        table.len()
    );
    table
}

pub fn parse_coordinates(content: &str) -> CoordinateTable {
    parse_table(content, "coordinate", parse_coordinate_line)
}

pub fn parse_voltages(content: &str) -> VoltageTable {
    parse_table(content, "voltage", parse_voltage_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_field() {
        assert_eq!(parse_numeric_field("1.25"), Some(1.25));
        assert_eq!(parse_numeric_field("-3e-2"), Some(-0.03));
        assert_eq!(parse_numeric_field("42"), Some(42.0));
        assert_eq!(parse_numeric_field("1.2V"), None);
        assert_eq!(parse_numeric_field("abc"), None);
        assert_eq!(parse_numeric_field("nan"), None);
    }

    #[test]
    fn test_coordinate_line_shapes() {
        let full = parse_coordinate_line("n1 10 20 M1").unwrap();
        assert_eq!(full.label, "N1");
        assert_eq!((full.x, full.y), (Some(10.0), Some(20.0)));
        assert_eq!(full.layer.as_deref(), Some("M1"));

        let short = parse_coordinate_line("n2 10").unwrap();
        assert_eq!((short.x, short.y), (Some(10.0), None));

        assert!(parse_coordinate_line("n3").is_none());
        assert!(parse_coordinate_line("n4 1 2 M1 extra").is_none());
    }

    #[test]
    fn test_malformed_coordinate_is_undefined() {
        let record = parse_coordinate_line("n1 x 20").unwrap();
        assert_eq!(record.x, None);
        assert_eq!(record.y, Some(20.0));
    }

    #[test]
    fn test_voltage_line_ignores_extra_fields() {
        let record = parse_voltage_line("vdd_3 0.95 extra 1 2 3").unwrap();
        assert_eq!(record.label, "VDD_3");
        assert_eq!(record.voltage, Some(0.95));
        assert!(parse_voltage_line("lonely").is_none());
    }
}
