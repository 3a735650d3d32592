// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::error::Result;
use crate::merge::{MergeReport, MergedSample};
use crate::render::{Heatmap, Legend};

#[derive(Debug, Serialize)]
pub struct UnmatchedCsvRecord {
    #[serde(rename = "Node")]
    pub label: String,
    #[serde(rename = "Reason")]
    pub reason: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LegendCsvRecord {
    #[serde(rename = "Voltage")]
    pub value: f64,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Color")]
    pub color: String,
}

fn legend_to_csv_records(legend: &Legend) -> Vec<LegendCsvRecord> {
    legend
        .ticks
        .iter()
        .map(|tick| {
            let [r, g, b, _] = tick.color;
            LegendCsvRecord {
                value: tick.value,
                label: tick.label.clone(),
                color: format!("#{r:02x}{g:02x}{b:02x}"),
            }
        })
        .collect()
}

/// Flatten a merge report into one row per dropped label
fn report_to_csv_records(report: &MergeReport) -> Vec<UnmatchedCsvRecord> {
    let rows = |labels: &[String], reason: &'static str| {
        labels
            .iter()
            .map(move |label| UnmatchedCsvRecord {
                label: label.clone(),
                reason,
            })
            .collect::<Vec<_>>()
    };

    let mut records = rows(&report.coordinate_only, "missing voltage");
    records.extend(rows(&report.voltage_only, "missing coordinate"));
    records.extend(rows(&report.undefined, "undefined value"));
    records
}

/// Export merged samples to CSV file
pub fn export_samples_to_csv<P: AsRef<Path>>(samples: &[MergedSample], file_path: P) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(file);

    for sample in samples {
        writer.serialize(sample)?;
    }

    writer.flush()?;
    Ok(())
}

/// Export labels dropped by the merge to CSV file
pub fn export_merge_report_to_csv<P: AsRef<Path>>(report: &MergeReport, file_path: P) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(file);

    for record in report_to_csv_records(report) {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Export the colorbar ticks (value, label, color) to CSV file
///
/// The PNG colorbar has unlabeled ticks; this is its key.
pub fn export_legend_to_csv<P: AsRef<Path>>(legend: &Legend, file_path: P) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(file);

    for record in legend_to_csv_records(legend) {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Save the heatmap with its colorbar as PNG
pub fn export_heatmap_png<P: AsRef<Path>>(heatmap: &Heatmap, file_path: P) -> Result<()> {
    heatmap
        .image
        .save_with_format(file_path, image::ImageFormat::Png)?;
    Ok(())
}
