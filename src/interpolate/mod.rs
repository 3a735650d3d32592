// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Scattered-sample interpolation onto a regular grid.

use std::collections::HashMap;

use crate::config::Interpolation;
use crate::error::{HeatmapError, Result};
use crate::layout::BoundingBox;
use crate::merge::MergedSample;

pub mod clough_tocher;
pub mod delaunay;

use clough_tocher::CloughTocher2D;
use delaunay::{Triangulation, Vec2};

/// Regular lattice spanning a bounding box, both edges included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub bbox: BoundingBox,
    pub nx: usize,
    pub ny: usize,
}

impl Grid {
    pub fn new(bbox: BoundingBox, nx: usize, ny: usize) -> Result<Self> {
        if nx < 2 || ny < 2 {
            return Err(HeatmapError::InvalidConfig(format!(
                "grid resolution must be at least 2x2, got {nx}x{ny}"
            )));
        }
        if !(bbox.width() > 0.0 && bbox.height() > 0.0) {
            return Err(HeatmapError::DegenerateBoundingBox {
                xmin: bbox.xmin,
                ymin: bbox.ymin,
                xmax: bbox.xmax,
                ymax: bbox.ymax,
            });
        }
        Ok(Self { bbox, nx, ny })
    }

    pub fn x(&self, i: usize) -> f64 {
        if i + 1 == self.nx {
            return self.bbox.xmax;
        }
        self.bbox.xmin + i as f64 * self.bbox.width() / (self.nx - 1) as f64
    }

    pub fn y(&self, j: usize) -> f64 {
        if j + 1 == self.ny {
            return self.bbox.ymax;
        }
        self.bbox.ymin + j as f64 * self.bbox.height() / (self.ny - 1) as f64
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major index; row `j` runs along X at height `y(j)`.
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    /// `(i, j, x, y)` for every grid point in row-major order.
    pub fn points(&self) -> impl Iterator<Item = (usize, usize, f64, f64)> + '_ {
        (0..self.ny).flat_map(move |j| (0..self.nx).map(move |i| (i, j, self.x(i), self.y(j))))
    }
}

/// One value per grid point; `None` outside the convex hull of the samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pub grid: Grid,
    pub values: Vec<Option<f64>>,
}

impl ScalarField {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values[self.grid.index(i, j)]
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Range of the interpolated values, overshoot included.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Similarity map into the unit box, so triangulation tolerances do not
/// depend on the layout's database units.
#[derive(Debug, Clone, Copy)]
struct Normalization {
    origin: Vec2,
    scale: f64,
}

impl Normalization {
    fn apply(&self, x: f64, y: f64) -> Vec2 {
        [(x - self.origin[0]) / self.scale, (y - self.origin[1]) / self.scale]
    }
}

/// Collapse samples sharing a location into one sample with the mean voltage.
fn collapse_coincident(samples: &[MergedSample]) -> (Vec<Vec2>, Vec<f64>) {
    let mut slots: HashMap<(u64, u64), usize> = HashMap::new();
    let mut points: Vec<Vec2> = Vec::new();
    let mut sums: Vec<(f64, usize)> = Vec::new();

    for sample in samples {
        // + 0.0 folds -0.0 into 0.0
        let key = ((sample.x + 0.0).to_bits(), (sample.y + 0.0).to_bits());
        match slots.get(&key) {
            Some(&slot) => {
                sums[slot].0 += sample.voltage;
                sums[slot].1 += 1;
            }
            None => {
                slots.insert(key, points.len());
                points.push([sample.x, sample.y]);
                sums.push((sample.voltage, 1));
            }
        }
    }

    let values = sums.into_iter().map(|(sum, n)| sum / n as f64).collect();
    (points, values)
}

pub struct FieldInterpolator {
    method: Interpolation,
    normalization: Normalization,
    interpolant: CloughTocher2D,
}

impl FieldInterpolator {
    /// Fit the interpolant. Fails with `NoOverlap` for an empty sample set and
    /// `InsufficientSamples` when no triangle can be formed.
    pub fn fit(samples: &[MergedSample], method: Interpolation) -> Result<Self> {
        if samples.is_empty() {
            return Err(HeatmapError::NoOverlap);
        }

        let (points, values) = collapse_coincident(samples);
        if points.len() < samples.len() {
            log::info!(
                "[INFO] Averaged {} samples sharing a location into {} points",
                samples.len(),
                points.len()
            );
        }
        let distinct = points.len();

        let (mut xmin, mut ymin, mut xmax, mut ymax) =
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &points {
            xmin = xmin.min(p[0]);
            ymin = ymin.min(p[1]);
            xmax = xmax.max(p[0]);
            ymax = ymax.max(p[1]);
        }
        let extent = (xmax - xmin).max(ymax - ymin);
        if distinct < 3 || extent <= 0.0 {
            return Err(HeatmapError::InsufficientSamples { distinct });
        }
        let normalization = Normalization {
            origin: [xmin, ymin],
            scale: extent,
        };

        let normalized = points
            .iter()
            .map(|p| normalization.apply(p[0], p[1]))
            .collect();
        let triangulation = Triangulation::new(normalized)
            .ok_or(HeatmapError::InsufficientSamples { distinct })?;
        log::info!(
            "[INFO] Delaunay triangulation: {} points, {} triangles",
            distinct,
            triangulation.simplices.len()
        );

        let interpolant = match method {
            Interpolation::CloughTocher => CloughTocher2D::new(triangulation, values),
        };

        Ok(Self {
            method,
            normalization,
            interpolant,
        })
    }

    pub fn method(&self) -> Interpolation {
        self.method
    }

    /// Interpolated value at a layout coordinate, `None` outside the hull.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let mut hint = 0;
        self.interpolant
            .evaluate(self.normalization.apply(x, y), &mut hint)
    }

    pub fn evaluate(&self, grid: &Grid) -> ScalarField {
        let mut values = Vec::with_capacity(grid.len());
        let mut hint = 0;
        for (_, _, x, y) in grid.points() {
            let p = self.normalization.apply(x, y);
            values.push(self.interpolant.evaluate(p, &mut hint));
        }

        let field = ScalarField {
            grid: *grid,
            values,
        };
        log::info!(
            "[INFO] Interpolated {}x{} grid: {} of {} points inside the sample hull",
            grid.nx,
            grid.ny,
            field.defined_count(),
            grid.len()
        );
        field
    }
}

/// Fit and evaluate in one step.
pub fn interpolate(
    samples: &[MergedSample],
    grid: &Grid,
    method: Interpolation,
) -> Result<ScalarField> {
    Ok(FieldInterpolator::fit(samples, method)?.evaluate(grid))
}
