//! IR-Drop Heatmap Library
//!
//! This library overlays per-node voltage measurements on GDSII layout geometry:
//! it merges the measurement tables, interpolates them over the chosen cell and
//! renders a heatmap clipped to the cell outline.

pub mod clip;
pub mod config;
pub mod error;
pub mod export;
pub mod interpolate;
pub mod layout;
pub mod measurement;
pub mod merge;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use clip::ClipMask;
pub use config::{HeatmapConfig, Interpolation};
pub use error::{ErrorKind, HeatmapError, Result};
pub use interpolate::{FieldInterpolator, Grid, ScalarField};
pub use layout::{BoundingBox, LayoutCell, LayoutSource, Point, Polygon};
pub use measurement::{CoordinateTable, NodeCoordinate, VoltageSample, VoltageTable};
pub use merge::{merge, MergeReport, MergeResult, MergedSample};
pub use pipeline::{run_from_files, run_pipeline, HeatmapRun};
pub use render::{palette::Palette, render, Heatmap, Legend};
