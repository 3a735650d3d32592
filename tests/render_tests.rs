// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Test cases for color mapping, clipping and heatmap rasterization

use irdrop_viewer::render::TRANSPARENT;
use irdrop_viewer::{
    render, BoundingBox, ClipMask, Grid, HeatmapConfig, Legend, Palette, Point, Polygon,
    ScalarField,
};
use proptest::prelude::*;

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::new(vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ])
    .unwrap()
}

fn hue(rgba: [u8; 4]) -> f64 {
    let [r, g, b, _] = rgba.map(|c| c as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;
    if d == 0.0 {
        return 0.0;
    }
    let h = if max == r {
        60.0 * ((g - b) / d)
    } else if max == g {
        60.0 * ((b - r) / d) + 120.0
    } else {
        60.0 * ((r - g) / d) + 240.0
    };
    h.rem_euclid(360.0)
}

#[test]
fn test_jet_runs_from_blue_to_red() {
    let hues: Vec<f64> = [0.0, 0.25, 0.5, 0.75]
        .iter()
        .map(|&t| hue(Palette::Jet.color(t)))
        .collect();
    for pair in hues.windows(2) {
        assert!(pair[0] > pair[1], "hues not descending: {hues:?}");
    }
    assert_eq!(Palette::Jet.color(1.0), [128, 0, 0, 255]);
}

#[test]
fn test_palette_names_parse() {
    for palette in Palette::ALL {
        assert_eq!(palette.name().parse::<Palette>().unwrap(), palette);
    }
    assert_eq!("JET".parse::<Palette>().unwrap(), Palette::Jet);
    assert!("rainbow".parse::<Palette>().is_err());
}

#[test]
fn test_legend_saturates_out_of_range_values() {
    let legend = Legend::from_voltages(&[1.0, 3.0, 2.0], Palette::Jet, 5).unwrap();
    assert_eq!((legend.vmin, legend.vmax), (1.0, 3.0));
    assert_eq!(legend.color(3.4), legend.color(3.0));
    assert_eq!(legend.color(0.2), legend.color(1.0));

    let values: Vec<f64> = legend.ticks.iter().map(|t| t.value).collect();
    assert_eq!(values, vec![1.0, 1.5, 2.0, 2.5, 3.0]);
    assert_eq!(legend.ticks[0].label, "1.000 V");
}

#[test]
fn test_flat_legend_uses_palette_middle() {
    let legend = Legend::from_voltages(&[0.9, 0.9], Palette::Grayscale, 5).unwrap();
    assert_eq!(legend.normalize(0.9), 0.5);
    assert_eq!(legend.color(0.9), Palette::Grayscale.color(0.5));
}

#[test]
fn test_clip_mask_rasterizes_square() {
    let mask = ClipMask::new(&[square(2.0, 2.0, 8.0, 8.0)]);
    let grid = Grid::new(
        BoundingBox {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 10.0,
            ymax: 10.0,
        },
        11,
        11,
    )
    .unwrap();
    let visible = mask.rasterize(&grid);
    assert_eq!(visible.iter().filter(|&&v| v).count(), 49);
    assert!(visible[grid.index(5, 5)]);
    assert!(!visible[grid.index(1, 5)]);
    assert!(visible[grid.index(2, 5)]);
}

#[test]
fn test_outside_polygon_is_transparent() {
    let polygon = square(2.0, 2.0, 8.0, 8.0);
    let grid = Grid::new(
        BoundingBox {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 10.0,
            ymax: 10.0,
        },
        11,
        11,
    )
    .unwrap();
    let values = grid.points().map(|(_, _, x, _)| Some(1.0 + x / 10.0)).collect();
    let field = ScalarField { grid, values };
    let mask = ClipMask::new(std::slice::from_ref(&polygon));
    let config = HeatmapConfig {
        grid_nx: 11,
        grid_ny: 11,
        ..Default::default()
    };

    let heatmap = render(&field, &mask, &[polygon], &[1.0, 2.0], &config).unwrap();
    assert_eq!(heatmap.field_width, 11);
    assert_eq!(heatmap.field_height, 11);
    assert!(heatmap.image.width() > heatmap.field_width);

    assert_eq!(heatmap.pixel_at(0.0, 0.0), Some(TRANSPARENT));
    assert_eq!(heatmap.pixel_at(9.5, 5.0), Some(TRANSPARENT));
    assert_eq!(heatmap.pixel_at(5.0, 0.5), Some(TRANSPARENT));

    let inside = heatmap.pixel_at(5.0, 5.0).unwrap();
    assert_eq!(inside, heatmap.legend.color(1.5));
    assert_eq!(inside[3], 255);

    // Outline drawn on top of the field
    assert_eq!(heatmap.pixel_at(2.0, 5.0), Some(config.outline_color));
}

#[test]
fn test_scaled_render_grows_image() {
    let polygon = square(0.0, 0.0, 4.0, 4.0);
    let grid = Grid::new(
        BoundingBox {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 4.0,
            ymax: 4.0,
        },
        5,
        5,
    )
    .unwrap();
    let field = ScalarField {
        grid,
        values: vec![Some(1.0); 25],
    };
    let mask = ClipMask::new(std::slice::from_ref(&polygon));
    let config = HeatmapConfig {
        grid_nx: 5,
        grid_ny: 5,
        scale: 4,
        ..Default::default()
    };
    let heatmap = render(&field, &mask, &[polygon], &[1.0], &config).unwrap();
    assert_eq!(heatmap.field_width, 20);
    assert_eq!(heatmap.image.height(), 20);
    assert_eq!(heatmap.pixel_at(2.0, 2.0), Some(heatmap.legend.color(1.0)));
}

proptest! {
    #[test]
    fn grayscale_intensity_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let dark = Palette::Grayscale.color(lo);
        let light = Palette::Grayscale.color(hi);
        prop_assert!(dark[0] <= light[0]);
        prop_assert_eq!(dark[0], dark[1]);
        prop_assert_eq!(dark[1], dark[2]);
    }

    #[test]
    fn legend_normalization_is_monotonic(
        vmin in -2.0f64..2.0,
        span in 0.01f64..2.0,
        a in -5.0f64..5.0,
        b in -5.0f64..5.0,
    ) {
        let legend = Legend::from_voltages(&[vmin, vmin + span], Palette::Jet, 5).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (tlo, thi) = (legend.normalize(lo), legend.normalize(hi));
        prop_assert!(tlo <= thi);
        prop_assert!((0.0..=1.0).contains(&tlo) && (0.0..=1.0).contains(&thi));
    }
}
