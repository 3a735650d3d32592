// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HeatmapError>;

/// Coarse classification of fatal pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required input is missing or empty.
    InputAbsence,
    /// The layout geometry cannot support a heatmap.
    Geometry,
    /// Samples do not satisfy the interpolation preconditions.
    Algorithm,
    Config,
    Io,
}

#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("No file selected")]
    NoFileSelected,
    #[error("No cells found in the layout file")]
    NoCellsFound,
    #[error("Cell not found: {0}")]
    CellNotFound(String),
    #[error("No node labels are shared by the coordinate and voltage tables")]
    NoOverlap,
    #[error("Cell {0} has no polygons")]
    EmptyCell(String),
    #[error("Bounding box ({xmin}, {ymin}) - ({xmax}, {ymax}) has zero area")]
    DegenerateBoundingBox {
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
    },
    #[error("Interpolation needs at least 3 non-collinear samples, got {distinct} distinct")]
    InsufficientSamples { distinct: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GDS error: {0}")]
    Gds(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl HeatmapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HeatmapError::NoFileSelected
            | HeatmapError::NoCellsFound
            | HeatmapError::CellNotFound(_)
            | HeatmapError::NoOverlap => ErrorKind::InputAbsence,
            HeatmapError::EmptyCell(_) | HeatmapError::DegenerateBoundingBox { .. } => {
                ErrorKind::Geometry
            }
            HeatmapError::InsufficientSamples { .. } => ErrorKind::Algorithm,
            HeatmapError::InvalidConfig(_) => ErrorKind::Config,
            HeatmapError::Io(_)
            | HeatmapError::Gds(_)
            | HeatmapError::Image(_)
            | HeatmapError::Csv(_) => ErrorKind::Io,
        }
    }
}

impl From<gds21::GdsError> for HeatmapError {
    fn from(err: gds21::GdsError) -> Self {
        HeatmapError::Gds(format!("{err:?}"))
    }
}
