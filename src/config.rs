// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Heatmap pipeline configuration
//!
//! Every constant the pipeline depends on lives here with its default, so the
//! viewer can persist it and the command-line tool can override it.

use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, Result};
use crate::render::palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolation {
    /// Piecewise cubic Clough-Tocher patches over a Delaunay triangulation.
    #[default]
    CloughTocher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Grid points along X.
    pub grid_nx: usize,
    /// Grid points along Y.
    pub grid_ny: usize,
    pub palette: Palette,
    pub interpolation: Interpolation,
    /// Cell to visualize; the last cell in the library when unset.
    pub cell: Option<String>,
    /// RGBA color of the polygon outline stroke.
    pub outline_color: [u8; 4],
    /// Output pixels per grid cell.
    pub scale: u32,
    /// Number of labeled legend ticks.
    pub legend_ticks: usize,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            grid_nx: 200,
            grid_ny: 200,
            palette: Palette::Jet,
            interpolation: Interpolation::CloughTocher,
            cell: None,
            outline_color: [0, 0, 0, 255],
            scale: 1,
            legend_ticks: 5,
        }
    }
}

impl HeatmapConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_nx < 2 || self.grid_ny < 2 {
            return Err(HeatmapError::InvalidConfig(format!(
                "grid resolution must be at least 2x2, got {}x{}",
                self.grid_nx, self.grid_ny
            )));
        }
        if self.scale == 0 {
            return Err(HeatmapError::InvalidConfig(
                "scale must be at least 1".to_string(),
            ));
        }
        if self.legend_ticks < 2 {
            return Err(HeatmapError::InvalidConfig(format!(
                "legend needs at least 2 ticks, got {}",
                self.legend_ticks
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = HeatmapConfig::default();
        assert_eq!((config.grid_nx, config.grid_ny), (200, 200));
        assert_eq!(config.palette, Palette::Jet);
        assert_eq!(config.interpolation, Interpolation::CloughTocher);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_single_row_grid() {
        let config = HeatmapConfig {
            grid_ny: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HeatmapError::InvalidConfig(_))
        ));
    }
}
