// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Layout geometry: cells, polygons and their bounding boxes.

use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, Result};

pub mod reader;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Closed outline of at least three vertices. The closing edge is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Build a polygon, dropping repeated consecutive vertices and an explicit
    /// closing vertex. Returns `None` when fewer than 3 vertices remain.
    pub fn new(points: Vec<Point>) -> Option<Self> {
        let mut deduplicated: Vec<Point> = Vec::with_capacity(points.len());
        for point in points {
            if deduplicated.last() != Some(&point) {
                deduplicated.push(point);
            }
        }
        while deduplicated.len() > 1 && deduplicated.first() == deduplicated.last() {
            deduplicated.pop();
        }
        if deduplicated.len() < 3 {
            return None;
        }
        Some(Self {
            points: deduplicated,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Smallest box holding every point, `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            xmin: first.x,
            ymin: first.y,
            xmax: first.x,
            ymax: first.y,
        };
        for p in iter {
            bbox.xmin = bbox.xmin.min(p.x);
            bbox.ymin = bbox.ymin.min(p.y);
            bbox.xmax = bbox.xmax.max(p.x);
            bbox.ymax = bbox.ymax.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutCell {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl LayoutCell {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        Self {
            name: name.into(),
            polygons,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(|p| p.points.len()).sum()
    }

    /// Min/max over every vertex of every polygon in the cell.
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::from_points(self.polygons.iter().flat_map(|p| p.points.iter()))
            .ok_or_else(|| HeatmapError::EmptyCell(self.name.clone()))
    }
}

/// Read access to a hierarchical polygon container.
///
/// Cells are enumerated in container order; that order decides which cell is
/// picked when no name is requested.
pub trait LayoutSource {
    fn cell_names(&self) -> Vec<String>;

    fn cell_polygons(&self, index: usize) -> Vec<Polygon>;
}

impl LayoutSource for [LayoutCell] {
    fn cell_names(&self) -> Vec<String> {
        self.iter().map(|cell| cell.name.clone()).collect()
    }

    fn cell_polygons(&self, index: usize) -> Vec<Polygon> {
        self.get(index)
            .map(|cell| cell.polygons.clone())
            .unwrap_or_default()
    }
}

impl LayoutSource for Vec<LayoutCell> {
    fn cell_names(&self) -> Vec<String> {
        self.as_slice().cell_names()
    }

    fn cell_polygons(&self, index: usize) -> Vec<Polygon> {
        self.as_slice().cell_polygons(index)
    }
}

/// Pick the requested cell, or the last one in container order.
pub fn select_cell<S: LayoutSource + ?Sized>(source: &S, name: Option<&str>) -> Result<LayoutCell> {
    let names = source.cell_names();
    if names.is_empty() {
        return Err(HeatmapError::NoCellsFound);
    }

    let index = match name {
        Some(requested) => names
            .iter()
            .rposition(|candidate| candidate == requested)
            .ok_or_else(|| HeatmapError::CellNotFound(requested.to_string()))?,
        None => names.len() - 1,
    };

    let cell = LayoutCell::new(names[index].clone(), source.cell_polygons(index));
    log::info!(
        "[INFO] Selected cell {} ({} of {}): {} polygons, {} vertices",
        cell.name,
        index + 1,
        names.len(),
        cell.polygons.len(),
        cell.vertex_count()
    );
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size),
            Point::new(x0, y0 + size),
        ])
        .unwrap()
    }

    #[test]
    fn test_polygon_drops_closing_vertex() {
        let polygon = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(polygon.points().len(), 3);
    }

    #[test]
    fn test_polygon_rejects_two_vertices() {
        assert!(Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_bounding_box_spans_all_polygons() {
        let cell = LayoutCell::new("TOP", vec![square(0.0, 0.0, 1.0), square(5.0, -2.0, 3.0)]);
        let bbox = cell.bounding_box().unwrap();
        assert_eq!(bbox.as_tuple(), (0.0, -2.0, 8.0, 1.0));
    }

    #[test]
    fn test_empty_cell_has_no_bounding_box() {
        let cell = LayoutCell::new("EMPTY", Vec::new());
        assert!(matches!(cell.bounding_box(), Err(HeatmapError::EmptyCell(name)) if name == "EMPTY"));
    }

    #[test]
    fn test_named_selection() {
        let cells = vec![
            LayoutCell::new("A", vec![square(0.0, 0.0, 1.0)]),
            LayoutCell::new("B", Vec::new()),
        ];
        assert_eq!(select_cell(&cells, Some("A")).unwrap().name, "A");
        assert!(matches!(
            select_cell(&cells, Some("C")),
            Err(HeatmapError::CellNotFound(name)) if name == "C"
        ));
    }
}
