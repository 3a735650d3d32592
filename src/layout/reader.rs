// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::path::Path;

use gds21::{GdsElement, GdsLibrary};

use super::{LayoutSource, Point, Polygon};
use crate::error::Result;

pub struct LayoutReader;

impl LayoutReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<GdsLibrary> {
        let path_str = path.as_ref().display().to_string();
        log::info!("[LOAD] Loading GDS file: {path_str}");

        let size = std::fs::metadata(path.as_ref())?.len();
        log::info!("[FILE] GDS file size: {size} bytes");

        match GdsLibrary::load(path.as_ref()) {
            Ok(lib) => {
                log::info!("[PASS] GDS parsed successfully!");
                log::info!(
                    "[INFO] Library {} with {} cells: {:?}",
                    lib.name,
                    lib.structs.len(),
                    lib.structs.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
                );
                Ok(lib)
            }
            Err(e) => {
                log::error!("[FAIL] Failed to parse GDS file: {e:?}");
                Err(e.into())
            }
        }
    }
}

impl Default for LayoutReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutSource for GdsLibrary {
    fn cell_names(&self) -> Vec<String> {
        self.structs.iter().map(|s| s.name.clone()).collect()
    }

    /// Boundary elements of the cell, scaled from database units to user units.
    fn cell_polygons(&self, index: usize) -> Vec<Polygon> {
        let Some(gds_struct) = self.structs.get(index) else {
            return Vec::new();
        };
        let scale = self.units.user_unit();

        let mut skipped = 0usize;
        let polygons: Vec<Polygon> = gds_struct
            .elems
            .iter()
            .filter_map(|elem| match elem {
                GdsElement::GdsBoundary(boundary) => {
                    let points = boundary
                        .xy
                        .iter()
                        .map(|p| Point::new(p.x as f64 * scale, p.y as f64 * scale))
                        .collect();
                    let polygon = Polygon::new(points);
                    if polygon.is_none() {
                        skipped += 1;
                    }
                    polygon
                }
                _ => None,
            })
            .collect();

        if skipped > 0 {
            log::warn!(
                "[WARN] Cell {}: skipped {skipped} boundaries with fewer than 3 vertices",
                gds_struct.name
            );
        }
        polygons
    }
}
