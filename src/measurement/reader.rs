// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fs;
use std::path::Path;

use super::parser::{parse_coordinates, parse_voltages};
use super::{CoordinateTable, VoltageTable};
use crate::error::Result;

pub struct MeasurementReader;

impl MeasurementReader {
    pub fn new() -> Self {
        Self
    }

    fn load<P: AsRef<Path>>(&self, path: P, kind: &str) -> Result<String> {
        let path_str = path.as_ref().display().to_string();
        log::info!("[LOAD] Loading {kind} table: {path_str}");

        let content = fs::read_to_string(path)?;
        log::info!("[FILE] {kind} table size: {} bytes", content.len());

        for (i, line) in content.lines().take(5).enumerate() {
            log::debug!("[FILE]   {}: {}", i + 1, line);
        }
        Ok(content)
    }

    pub fn read_coordinates<P: AsRef<Path>>(&self, path: P) -> Result<CoordinateTable> {
        let content = self.load(path, "coordinate")?;
        Ok(parse_coordinates(&content))
    }

    pub fn read_voltages<P: AsRef<Path>>(&self, path: P) -> Result<VoltageTable> {
        let content = self.load(path, "voltage")?;
        Ok(parse_voltages(&content))
    }
}

impl Default for MeasurementReader {
    fn default() -> Self {
        Self::new()
    }
}
