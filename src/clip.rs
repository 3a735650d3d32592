// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Layout outline mask.
//!
//! The mask is the union of every polygon interior of the cell. A point is
//! inside when it lies in at least one polygon under the non-zero winding
//! rule; points on an edge count as inside. The rule only matters for
//! self-intersecting outlines.

use geo::{BoundingRect, Coord, Intersects, LineString, MultiPolygon, Polygon as GeoPolygon, Rect};

use crate::interpolate::Grid;
use crate::layout::Polygon;

#[derive(Debug, Clone)]
pub struct ClipMask {
    region: MultiPolygon<f64>,
    bounds: Vec<Rect<f64>>,
}

fn to_geo(polygon: &Polygon) -> GeoPolygon<f64> {
    let coords: Vec<Coord<f64>> = polygon
        .points()
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect();
    // the exterior ring is closed by geo
    GeoPolygon::new(LineString::from(coords), vec![])
}

impl ClipMask {
    pub fn new(polygons: &[Polygon]) -> Self {
        let members: Vec<GeoPolygon<f64>> = polygons.iter().map(to_geo).collect();
        let bounds = members.iter().filter_map(|p| p.bounding_rect()).collect();
        log::debug!("[DBG] Clip mask built from {} polygons", members.len());
        Self {
            region: MultiPolygon::new(members),
            bounds,
        }
    }

    pub fn region(&self) -> &MultiPolygon<f64> {
        &self.region
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let c = Coord { x, y };
        self.region
            .0
            .iter()
            .zip(&self.bounds)
            .any(|(polygon, rect)| {
                c.x >= rect.min().x
                    && c.x <= rect.max().x
                    && c.y >= rect.min().y
                    && c.y <= rect.max().y
                    && polygon.intersects(&c)
            })
    }

    /// Visibility of every grid point, in the grid's row-major order.
    pub fn rasterize(&self, grid: &Grid) -> Vec<bool> {
        let mask: Vec<bool> = grid.points().map(|(_, _, x, y)| self.contains(x, y)).collect();
        log::info!(
            "[INFO] Clip mask: {} of {} grid points inside the outline",
            mask.iter().filter(|&&inside| inside).count(),
            mask.len()
        );
        mask
    }
}
