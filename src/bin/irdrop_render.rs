// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Headless heatmap rendering.
//!
//! Usage:
//!   irdrop-render <layout.gds> <nodes.txt> <voltages.txt> -o heatmap.png [options]

use std::path::PathBuf;
use std::process::ExitCode;

use irdrop_viewer::export::{
    export_heatmap_png, export_legend_to_csv, export_merge_report_to_csv, export_samples_to_csv,
};
use irdrop_viewer::{run_from_files, HeatmapConfig, Palette};

#[derive(clap::Parser, Debug)]
#[command(name = "irdrop-render")]
#[command(about = "Render an IR-drop heatmap clipped to a GDS cell outline")]
struct Args {
    /// GDSII layout file.
    layout: PathBuf,

    /// Node coordinate table: LABEL X Y [LAYER].
    coordinates: PathBuf,

    /// Node voltage table: LABEL VOLTAGE [...].
    voltages: PathBuf,

    /// Output PNG path.
    #[clap(short, long, default_value = "heatmap.png")]
    output: PathBuf,

    /// Cell to render. Defaults to the last cell in the library.
    #[clap(long)]
    cell: Option<String>,

    /// Grid points along X.
    #[clap(long, default_value = "200")]
    nx: usize,

    /// Grid points along Y.
    #[clap(long, default_value = "200")]
    ny: usize,

    /// Color palette: jet, viridis, grayscale.
    #[clap(long, default_value = "jet")]
    palette: Palette,

    /// Output pixels per grid cell.
    #[clap(long, default_value = "1")]
    scale: u32,

    /// Also write the merged samples as CSV.
    #[clap(long)]
    samples_csv: Option<PathBuf>,

    /// Also write labels dropped by the merge as CSV.
    #[clap(long)]
    unmatched_csv: Option<PathBuf>,

    /// Also write the colorbar tick values and colors as CSV.
    #[clap(long)]
    legend_csv: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = <Args as clap::Parser>::parse();
    log::debug!("[DBG] Render args:\n{:#?}", args);

    let config = HeatmapConfig {
        grid_nx: args.nx,
        grid_ny: args.ny,
        palette: args.palette,
        cell: args.cell.clone(),
        scale: args.scale,
        ..Default::default()
    };

    let run = match run_from_files(&args.layout, &args.coordinates, &args.voltages, &config) {
        Ok(run) => run,
        Err(e) => {
            log::error!("[FAIL] {e} ({:?})", e.kind());
            return ExitCode::FAILURE;
        }
    };

    let ticks: Vec<&str> = run.heatmap.legend.ticks.iter().map(|t| t.label.as_str()).collect();
    log::info!("[INFO] Colorbar ticks: {}", ticks.join(", "));

    let mut result = export_heatmap_png(&run.heatmap, &args.output);
    if let Some(path) = &args.samples_csv {
        result = result.and_then(|()| export_samples_to_csv(&run.merge.samples, path));
    }
    if let Some(path) = &args.unmatched_csv {
        result = result.and_then(|()| export_merge_report_to_csv(&run.merge.report, path));
    }
    if let Some(path) = &args.legend_csv {
        result = result.and_then(|()| export_legend_to_csv(&run.heatmap.legend, path));
    }

    match result {
        Ok(()) => {
            log::info!("[PASS] Heatmap written to {}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("[FAIL] Export failed: {e}");
            ExitCode::FAILURE
        }
    }
}
