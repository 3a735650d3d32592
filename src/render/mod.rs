// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Heatmap rasterization.
//!
//! The color scale is calibrated against the measured voltages, not against
//! the interpolated field: cubic overshoot beyond the measured range saturates
//! at the palette ends. Undefined and clipped grid points stay transparent.

use image::{Rgba, RgbaImage};

use crate::clip::ClipMask;
use crate::config::HeatmapConfig;
use crate::error::{HeatmapError, Result};
use crate::interpolate::{Grid, ScalarField};
use crate::layout::{BoundingBox, Polygon};

pub mod palette;

use palette::Palette;

pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
pub const VOLTAGE_UNIT: &str = "V";

/// Gap between the field and the colorbar, in pixels.
const COLORBAR_GAP: u32 = 8;
const COLORBAR_WIDTH: u32 = 16;
const TICK_LENGTH: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct LegendTick {
    pub value: f64,
    pub color: [u8; 4],
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub vmin: f64,
    pub vmax: f64,
    pub unit: &'static str,
    pub palette: Palette,
    /// Ascending from `vmin` to `vmax`.
    pub ticks: Vec<LegendTick>,
}

impl Legend {
    /// Legend spanning the measured voltages.
    pub fn from_voltages(voltages: &[f64], palette: Palette, tick_count: usize) -> Result<Self> {
        let (vmin, vmax) = voltages
            .iter()
            .fold(None, |range: Option<(f64, f64)>, &v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .ok_or(HeatmapError::NoOverlap)?;

        let mut legend = Self {
            vmin,
            vmax,
            unit: VOLTAGE_UNIT,
            palette,
            ticks: Vec::new(),
        };
        let steps = tick_count.max(2) - 1;
        legend.ticks = (0..=steps)
            .map(|k| {
                let value = if k == steps {
                    vmax
                } else {
                    vmin + (vmax - vmin) * k as f64 / steps as f64
                };
                LegendTick {
                    value,
                    color: legend.color(value),
                    label: format!("{value:.3} {VOLTAGE_UNIT}"),
                }
            })
            .collect();
        Ok(legend)
    }

    /// Palette position of a voltage, clamped to [0, 1].
    pub fn normalize(&self, voltage: f64) -> f64 {
        if self.vmax > self.vmin {
            ((voltage - self.vmin) / (self.vmax - self.vmin)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    pub fn color(&self, voltage: f64) -> [u8; 4] {
        self.palette.color(self.normalize(voltage))
    }
}

/// The rendered overlay.
///
/// The raster carries the colorbar and its tick marks but no text; tick
/// values and the unit live on `legend` for whoever draws or exports them.
#[derive(Debug, Clone)]
pub struct Heatmap {
    /// Field on the left, colorbar strip on the right.
    pub image: RgbaImage,
    /// Width of the field part of `image`, in pixels.
    pub field_width: u32,
    pub field_height: u32,
    /// Layout area covered by the field part.
    pub extent: BoundingBox,
    pub legend: Legend,
}

impl Heatmap {
    /// Pixel of the field part holding a layout coordinate.
    pub fn pixel_at(&self, x: f64, y: f64) -> Option<[u8; 4]> {
        let nx = self.field_width as f64;
        let ny = self.field_height as f64;
        let px = ((x - self.extent.xmin) / self.extent.width() * nx).floor();
        let py = ((self.extent.ymax - y) / self.extent.height() * ny).floor();
        if px < 0.0 || py < 0.0 || px > nx || py > ny {
            return None;
        }
        let px = (px as u32).min(self.field_width - 1);
        let py = (py as u32).min(self.field_height - 1);
        Some(self.image.get_pixel(px, py).0)
    }
}

/// Maps layout coordinates to field pixels; grid point `(i, j)` owns the
/// `scale`-sized block centred on it, row 0 at the top.
struct PixelMapper {
    grid: Grid,
    scale: u32,
}

impl PixelMapper {
    fn to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let dx = self.grid.bbox.width() / (self.grid.nx - 1) as f64;
        let dy = self.grid.bbox.height() / (self.grid.ny - 1) as f64;
        let s = self.scale as f64;
        let px = ((x - self.grid.bbox.xmin) / dx + 0.5) * s;
        let py = ((self.grid.bbox.ymax - y) / dy + 0.5) * s;
        (px.floor() as i64, py.floor() as i64)
    }
}

/// Bresenham line clipped to the field area.
fn draw_line(
    image: &mut RgbaImage,
    from: (i64, i64),
    to: (i64, i64),
    limit: (u32, u32),
    color: [u8; 4],
) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 && (x0 as u32) < limit.0 && (y0 as u32) < limit.1 {
            image.put_pixel(x0 as u32, y0 as u32, Rgba(color));
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Colorbar strip with one unlabeled tick mark per legend tick.
fn draw_colorbar(image: &mut RgbaImage, legend: &Legend, left: u32, height: u32) {
    for py in 0..height {
        let t = if height > 1 {
            1.0 - py as f64 / (height - 1) as f64
        } else {
            0.5
        };
        let color = legend.palette.color(t);
        for px in left..left + COLORBAR_WIDTH {
            image.put_pixel(px, py, Rgba(color));
        }
    }

    for tick in &legend.ticks {
        let t = legend.normalize(tick.value);
        let py = ((1.0 - t) * (height.saturating_sub(1)) as f64).round() as u32;
        for px in left + COLORBAR_WIDTH..left + COLORBAR_WIDTH + TICK_LENGTH {
            image.put_pixel(px, py, Rgba([0, 0, 0, 255]));
        }
    }
}

/// Render the clipped field with outlines and a colorbar.
///
/// `voltages` are the measured sample values; they alone set the color scale.
pub fn render(
    field: &ScalarField,
    mask: &ClipMask,
    polygons: &[Polygon],
    voltages: &[f64],
    config: &HeatmapConfig,
) -> Result<Heatmap> {
    config.validate()?;
    let legend = Legend::from_voltages(voltages, config.palette, config.legend_ticks)?;
    let grid = field.grid;
    let scale = config.scale;
    let field_width = grid.nx as u32 * scale;
    let field_height = grid.ny as u32 * scale;
    let width = field_width + COLORBAR_GAP + COLORBAR_WIDTH + TICK_LENGTH;

    let mut image = RgbaImage::from_pixel(width, field_height, Rgba(TRANSPARENT));

    let visible = mask.rasterize(&grid);
    let mut painted = 0usize;
    for (i, j, _, _) in grid.points() {
        let index = grid.index(i, j);
        let Some(value) = field.values[index] else {
            continue;
        };
        if !visible[index] {
            continue;
        }
        let color = legend.color(value);
        let top = (grid.ny - 1 - j) as u32 * scale;
        let left = i as u32 * scale;
        for py in top..top + scale {
            for px in left..left + scale {
                image.put_pixel(px, py, Rgba(color));
            }
        }
        painted += 1;
    }

    let mapper = PixelMapper { grid, scale };
    for polygon in polygons {
        let points = polygon.points();
        for (k, a) in points.iter().enumerate() {
            let b = &points[(k + 1) % points.len()];
            draw_line(
                &mut image,
                mapper.to_pixel(a.x, a.y),
                mapper.to_pixel(b.x, b.y),
                (field_width, field_height),
                config.outline_color,
            );
        }
    }

    draw_colorbar(&mut image, &legend, field_width + COLORBAR_GAP, field_height);

    log::info!(
        "[INFO] Rendered {}x{} heatmap: {} colored cells, legend {:.4}..{:.4} {}",
        width,
        field_height,
        painted,
        legend.vmin,
        legend.vmax,
        legend.unit
    );

    // the field spans half a grid step beyond the outer grid points
    let half_dx = grid.bbox.width() / (grid.nx - 1) as f64 / 2.0;
    let half_dy = grid.bbox.height() / (grid.ny - 1) as f64 / 2.0;
    Ok(Heatmap {
        image,
        field_width,
        field_height,
        extent: BoundingBox {
            xmin: grid.bbox.xmin - half_dx,
            ymin: grid.bbox.ymin - half_dy,
            xmax: grid.bbox.xmax + half_dx,
            ymax: grid.bbox.ymax + half_dy,
        },
        legend,
    })
}
