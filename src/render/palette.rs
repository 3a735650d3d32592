// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use serde::{Deserialize, Serialize};

/// Piecewise-linear channel: `(position, value)` stops over [0, 1].
type Channel = &'static [(f64, f64)];

// Cold-to-hot ramp: dark blue, blue, cyan, yellow, red, dark red.
const JET_RED: Channel = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: Channel = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: Channel = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

const VIRIDIS_RED: Channel = &[
    (0.0, 0.267),
    (0.125, 0.282),
    (0.25, 0.231),
    (0.375, 0.173),
    (0.5, 0.128),
    (0.625, 0.153),
    (0.75, 0.369),
    (0.875, 0.678),
    (1.0, 0.993),
];
const VIRIDIS_GREEN: Channel = &[
    (0.0, 0.005),
    (0.125, 0.156),
    (0.25, 0.322),
    (0.375, 0.448),
    (0.5, 0.567),
    (0.625, 0.680),
    (0.75, 0.789),
    (0.875, 0.864),
    (1.0, 0.906),
];
const VIRIDIS_BLUE: Channel = &[
    (0.0, 0.329),
    (0.125, 0.470),
    (0.25, 0.546),
    (0.375, 0.558),
    (0.5, 0.553),
    (0.625, 0.520),
    (0.75, 0.383),
    (0.875, 0.185),
    (1.0, 0.144),
];

const GRAY: Channel = &[(0.0, 0.0), (1.0, 1.0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Palette {
    /// Cold-to-hot, the usual IR-drop ramp.
    #[default]
    Jet,
    Viridis,
    Grayscale,
}

fn sample_channel(stops: Channel, t: f64) -> f64 {
    for pair in stops.windows(2) {
        let (t0, v0) = pair[0];
        let (t1, v1) = pair[1];
        if t <= t1 {
            if t1 == t0 {
                return v1;
            }
            return v0 + (v1 - v0) * (t - t0) / (t1 - t0);
        }
    }
    stops.last().map(|&(_, v)| v).unwrap_or(0.0)
}

impl Palette {
    pub const ALL: [Palette; 3] = [Palette::Jet, Palette::Viridis, Palette::Grayscale];

    pub fn name(&self) -> &'static str {
        match self {
            Palette::Jet => "jet",
            Palette::Viridis => "viridis",
            Palette::Grayscale => "grayscale",
        }
    }

    fn channels(&self) -> [Channel; 3] {
        match self {
            Palette::Jet => [JET_RED, JET_GREEN, JET_BLUE],
            Palette::Viridis => [VIRIDIS_RED, VIRIDIS_GREEN, VIRIDIS_BLUE],
            Palette::Grayscale => [GRAY, GRAY, GRAY],
        }
    }

    /// Opaque RGBA color at palette position `t`, clamped to [0, 1].
    pub fn color(&self, t: f64) -> [u8; 4] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let [r, g, b] = self
            .channels()
            .map(|channel| (sample_channel(channel, t) * 255.0).round() as u8);
        [r, g, b, 255]
    }
}

impl std::str::FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Palette::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown palette: {s}"))
    }
}

impl std::fmt::Display for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jet_endpoints() {
        assert_eq!(Palette::Jet.color(0.0), [0, 0, 128, 255]);
        assert_eq!(Palette::Jet.color(1.0), [128, 0, 0, 255]);
        assert_eq!(Palette::Jet.color(0.5)[1], 255);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        for palette in Palette::ALL {
            assert_eq!(palette.color(-3.0), palette.color(0.0));
            assert_eq!(palette.color(7.5), palette.color(1.0));
        }
    }

    #[test]
    fn test_parse_name() {
        assert_eq!("JET".parse::<Palette>(), Ok(Palette::Jet));
        assert!("rainbow".parse::<Palette>().is_err());
    }
}
