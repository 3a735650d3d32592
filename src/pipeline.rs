// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! End-to-end heatmap pipeline.
//!
//! Layout and measurements load independently, the samples are merged and
//! interpolated over the cell's bounding box, then clipped to the cell outline
//! and rendered. Every stage runs to completion before the next one starts.

use std::path::Path;

use crate::clip::ClipMask;
use crate::config::HeatmapConfig;
use crate::error::Result;
use crate::interpolate::{FieldInterpolator, Grid, ScalarField};
use crate::layout::{reader::LayoutReader, select_cell, LayoutCell, LayoutSource};
use crate::measurement::{reader::MeasurementReader, CoordinateTable, VoltageTable};
use crate::merge::{merge, MergeResult};
use crate::render::{render, Heatmap};

/// Everything one run produced, kept for display and export.
#[derive(Debug, Clone)]
pub struct HeatmapRun {
    pub cell: LayoutCell,
    pub merge: MergeResult,
    pub field: ScalarField,
    pub heatmap: Heatmap,
}

pub fn run_pipeline<S: LayoutSource + ?Sized>(
    layout: &S,
    coordinates: &CoordinateTable,
    voltages: &VoltageTable,
    config: &HeatmapConfig,
) -> Result<HeatmapRun> {
    config.validate()?;

    let cell = select_cell(layout, config.cell.as_deref())?;
    let bbox = cell.bounding_box()?;
    log::info!(
        "[INFO] Cell {} bounding box: ({}, {}) - ({}, {})",
        cell.name,
        bbox.xmin,
        bbox.ymin,
        bbox.xmax,
        bbox.ymax
    );

    let merged = merge(coordinates, voltages);
    let grid = Grid::new(bbox, config.grid_nx, config.grid_ny)?;
    let field = FieldInterpolator::fit(&merged.samples, config.interpolation)?.evaluate(&grid);

    let mask = ClipMask::new(&cell.polygons);
    let voltages: Vec<f64> = merged.voltages().collect();
    let heatmap = render(&field, &mask, &cell.polygons, &voltages, config)?;

    log::info!("[PASS] Heatmap ready for cell {}", cell.name);
    Ok(HeatmapRun {
        cell,
        merge: merged,
        field,
        heatmap,
    })
}

/// Load the three inputs from disk and run the pipeline.
pub fn run_from_files<P, Q, R>(
    layout_path: P,
    coordinates_path: Q,
    voltages_path: R,
    config: &HeatmapConfig,
) -> Result<HeatmapRun>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let library = LayoutReader::new().read(layout_path)?;
    let reader = MeasurementReader::new();
    let coordinates = reader.read_coordinates(coordinates_path)?;
    let voltages = reader.read_voltages(voltages_path)?;
    run_pipeline(&library, &coordinates, &voltages, config)
}
