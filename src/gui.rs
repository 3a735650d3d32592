// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use eframe::egui;
use egui::epaint::{PathShape, PathStroke};
use egui_extras::{Column, TableBuilder};
use rfd::FileDialog;

use irdrop_viewer::export;
use irdrop_viewer::{run_from_files, HeatmapConfig, HeatmapError, HeatmapRun, Palette};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Number of color slices in the on-screen legend.
const LEGEND_SLICES: usize = 64;

/// Pipeline run state
#[derive(Debug, Clone, Default)]
enum LoadingState {
    #[default]
    Idle,
    Loading {
        file_name: String,
        start_time: Instant,
        show_progress: bool,
    },
}

/// Pipeline result message
#[derive(Debug)]
enum LoadingMessage {
    HeatmapReady(Box<Result<HeatmapRun, String>>),
}

/// Which input a file dialog is for
#[derive(Debug, Clone, Copy)]
enum InputKind {
    Layout,
    Coordinates,
    Voltages,
}

pub struct HeatmapViewer {
    layout_path: Option<String>,
    coordinates_path: Option<String>,
    voltages_path: Option<String>,
    config: HeatmapConfig,
    cell_name_input: String,
    run: Option<HeatmapRun>,
    texture: Option<egui::TextureHandle>,
    zoom: f32,
    pan_x: f32,
    pan_y: f32,
    error_message: Option<String>,
    success_message: Option<String>,
    show_outlines: bool,
    show_legend: bool,
    show_samples: bool,
    fit_to_view_requested: bool,
    loading_state: LoadingState,
    loading_receiver: Option<mpsc::Receiver<LoadingMessage>>,
}

impl HeatmapViewer {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config: HeatmapConfig = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let cell_name_input = config.cell.clone().unwrap_or_default();

        Self {
            layout_path: None,
            coordinates_path: None,
            voltages_path: None,
            config,
            cell_name_input,
            run: None,
            texture: None,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            error_message: None,
            success_message: None,
            show_outlines: true,
            show_legend: true,
            show_samples: true,
            fit_to_view_requested: false,
            loading_state: LoadingState::Idle,
            loading_receiver: None,
        }
    }

    fn check_loading_progress(&mut self, ctx: &egui::Context) {
        // Show the progress bar after 500ms
        if let LoadingState::Loading {
            start_time,
            show_progress,
            ..
        } = &mut self.loading_state
        {
            if !*show_progress && start_time.elapsed() >= Duration::from_millis(500) {
                *show_progress = true;
                ctx.request_repaint();
            }
        }

        if let Some(receiver) = &self.loading_receiver {
            match receiver.try_recv() {
                Ok(LoadingMessage::HeatmapReady(result)) => {
                    self.loading_state = LoadingState::Idle;
                    self.loading_receiver = None;
                    match *result {
                        Ok(run) => self.accept_run(ctx, run),
                        Err(error) => self.error_message = Some(error),
                    }
                    ctx.request_repaint();
                }
                Err(mpsc::TryRecvError::Empty) => {
                    // Still running
                    ctx.request_repaint_after(Duration::from_millis(100));
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.loading_state = LoadingState::Idle;
                    self.loading_receiver = None;
                    self.error_message = Some("Heatmap generation was interrupted".to_string());
                    ctx.request_repaint();
                }
            }
        }
    }

    fn accept_run(&mut self, ctx: &egui::Context, run: HeatmapRun) {
        let image = &run.heatmap.image;
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [image.width() as usize, image.height() as usize],
            image.as_raw(),
        );
        self.texture = Some(ctx.load_texture("heatmap", color_image, egui::TextureOptions::NEAREST));
        log::info!(
            "[PASS] Displaying heatmap for cell {} ({} samples)",
            run.cell.name,
            run.merge.samples.len()
        );
        self.run = Some(run);
        self.fit_to_view_requested = true;
    }

    fn start_heatmap_generation(&mut self) {
        let (Some(layout), Some(coordinates), Some(voltages)) = (
            self.layout_path.clone(),
            self.coordinates_path.clone(),
            self.voltages_path.clone(),
        ) else {
            self.error_message = Some(format!(
                "{}: select a GDS file, a coordinate table and a voltage table",
                HeatmapError::NoFileSelected
            ));
            return;
        };

        let trimmed = self.cell_name_input.trim();
        self.config.cell = (!trimmed.is_empty()).then(|| trimmed.to_string());
        if let Err(e) = self.config.validate() {
            self.error_message = Some(e.to_string());
            return;
        }

        let file_name = Path::new(&layout)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        self.loading_state = LoadingState::Loading {
            file_name,
            start_time: Instant::now(),
            show_progress: false,
        };

        let (tx, rx) = mpsc::channel();
        self.loading_receiver = Some(rx);

        let config = self.config.clone();
        thread::spawn(move || {
            let result = run_from_files(&layout, &coordinates, &voltages, &config)
                .map_err(|e| format!("Failed to generate heatmap: {e}"));
            let _ = tx.send(LoadingMessage::HeatmapReady(Box::new(result)));
        });
    }

    fn pick_input(&mut self, kind: InputKind) {
        let dialog = match kind {
            InputKind::Layout => FileDialog::new()
                .set_title("Select a .gds file")
                .add_filter("GDS files", &["gds", "gds2", "gdsii"])
                .add_filter("All files", &["*"]),
            InputKind::Coordinates => FileDialog::new()
                .set_title("Select the node coordinate table")
                .add_filter("Text files", &["txt", "nodes", "csv"])
                .add_filter("All files", &["*"]),
            InputKind::Voltages => FileDialog::new()
                .set_title("Select the node voltage table")
                .add_filter("Text files", &["txt", "volt", "csv"])
                .add_filter("All files", &["*"]),
        };

        // Cancelling keeps the previous selection
        if let Some(path) = dialog.pick_file() {
            let path = path.to_string_lossy().to_string();
            match kind {
                InputKind::Layout => self.layout_path = Some(path),
                InputKind::Coordinates => self.coordinates_path = Some(path),
                InputKind::Voltages => self.voltages_path = Some(path),
            }
        }
    }

    fn get_layout_basename(&self) -> String {
        self.layout_path
            .as_deref()
            .and_then(|p| Path::new(p).file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("heatmap")
            .to_string()
    }

    fn handle_export_png(&mut self) {
        let Some(run) = &self.run else { return };
        let default_filename = format!("{}_irdrop.png", self.get_layout_basename());
        if let Some(file_path) = FileDialog::new()
            .set_file_name(&default_filename)
            .add_filter("PNG images", &["png"])
            .save_file()
        {
            match export::export_heatmap_png(&run.heatmap, &file_path) {
                Ok(()) => {
                    self.success_message =
                        Some(format!("Heatmap exported to {}", file_path.display()));
                }
                Err(e) => {
                    self.error_message = Some(format!("Failed to export heatmap: {e}"));
                }
            }
        }
    }

    fn handle_export_samples_csv(&mut self) {
        let Some(run) = &self.run else { return };
        let default_filename = format!("{}_samples.csv", self.get_layout_basename());
        if let Some(file_path) = FileDialog::new()
            .set_file_name(&default_filename)
            .add_filter("CSV files", &["csv"])
            .save_file()
        {
            match export::export_samples_to_csv(&run.merge.samples, &file_path) {
                Ok(()) => {
                    self.success_message = Some(format!(
                        "{} samples exported to {}",
                        run.merge.samples.len(),
                        file_path.display()
                    ));
                }
                Err(e) => {
                    self.error_message = Some(format!("Failed to export samples: {e}"));
                }
            }
        }
    }

    fn handle_export_unmatched_csv(&mut self) {
        let Some(run) = &self.run else { return };
        let default_filename = format!("{}_unmatched.csv", self.get_layout_basename());
        if let Some(file_path) = FileDialog::new()
            .set_file_name(&default_filename)
            .add_filter("CSV files", &["csv"])
            .save_file()
        {
            match export::export_merge_report_to_csv(&run.merge.report, &file_path) {
                Ok(()) => {
                    self.success_message = Some(format!(
                        "{} unmatched labels exported to {}",
                        run.merge.report.unmatched_count(),
                        file_path.display()
                    ));
                }
                Err(e) => {
                    self.error_message = Some(format!("Failed to export unmatched labels: {e}"));
                }
            }
        }
    }

    fn handle_export_legend_csv(&mut self) {
        let Some(run) = &self.run else { return };
        let default_filename = format!("{}_legend.csv", self.get_layout_basename());
        if let Some(file_path) = FileDialog::new()
            .set_file_name(&default_filename)
            .add_filter("CSV files", &["csv"])
            .save_file()
        {
            match export::export_legend_to_csv(&run.heatmap.legend, &file_path) {
                Ok(()) => {
                    self.success_message =
                        Some(format!("Legend exported to {}", file_path.display()));
                }
                Err(e) => {
                    self.error_message = Some(format!("Failed to export legend: {e}"));
                }
            }
        }
    }

    fn fit_to_view(&mut self, available_size: egui::Vec2) {
        let Some(run) = &self.run else { return };
        let extent = run.heatmap.extent;
        let content_width = extent.width() as f32;
        let content_height = extent.height() as f32;

        if content_width > 0.0 && content_height > 0.0 {
            // Use 90% of available space for content, 10% for margin
            let scale_x = available_size.x * 0.9 / content_width;
            let scale_y = available_size.y * 0.9 / content_height;
            self.zoom = scale_x.min(scale_y).max(1e-6);

            let center_x = ((extent.xmin + extent.xmax) * 0.5) as f32;
            let center_y = ((extent.ymin + extent.ymax) * 0.5) as f32;
            // Screen Y grows downwards, layout Y upwards
            self.pan_x = -center_x * self.zoom;
            self.pan_y = center_y * self.zoom;
        }
    }

    fn to_screen(&self, center: egui::Pos2, x: f64, y: f64) -> egui::Pos2 {
        egui::pos2(
            center.x + self.pan_x + x as f32 * self.zoom,
            center.y + self.pan_y - y as f32 * self.zoom,
        )
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open GDS File").clicked() {
                    self.pick_input(InputKind::Layout);
                    ui.close_menu();
                }
                if ui.button("Open Coordinate Table").clicked() {
                    self.pick_input(InputKind::Coordinates);
                    ui.close_menu();
                }
                if ui.button("Open Voltage Table").clicked() {
                    self.pick_input(InputKind::Voltages);
                    ui.close_menu();
                }

                ui.separator();

                let has_run = self.run.is_some();
                if ui
                    .add_enabled(has_run, egui::Button::new("Export Heatmap PNG"))
                    .clicked()
                {
                    self.handle_export_png();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(has_run, egui::Button::new("Export Merged Samples CSV"))
                    .clicked()
                {
                    self.handle_export_samples_csv();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(has_run, egui::Button::new("Export Unmatched Labels CSV"))
                    .clicked()
                {
                    self.handle_export_unmatched_csv();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(has_run, egui::Button::new("Export Legend CSV"))
                    .clicked()
                {
                    self.handle_export_legend_csv();
                    ui.close_menu();
                }

                ui.separator();

                if ui.button("Exit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                ui.checkbox(&mut self.show_outlines, "Show Outlines");
                ui.checkbox(&mut self.show_legend, "Show Legend");
                ui.checkbox(&mut self.show_samples, "Show Samples Table");
                ui.separator();
                if ui.button("Fit to View (F)").clicked() {
                    self.fit_to_view_requested = true;
                    ui.close_menu();
                }
            });
        });
    }

    fn render_left_panel(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.heading("Files");

            let inputs = [
                ("GDS", &self.layout_path, InputKind::Layout),
                ("Coordinates", &self.coordinates_path, InputKind::Coordinates),
                ("Voltages", &self.voltages_path, InputKind::Voltages),
            ];
            let mut picked = None;
            for (label, path, kind) in inputs {
                ui.horizontal(|ui| {
                    if ui.button("...").clicked() {
                        picked = Some(kind);
                    }
                    match path {
                        Some(path) => ui.label(format!("{label}: {path}")),
                        None => ui.label(format!("No {label} file selected")),
                    };
                });
            }
            if let Some(kind) = picked {
                self.pick_input(kind);
            }

            ui.separator();
            ui.heading("Settings");

            ui.horizontal(|ui| {
                ui.label("Grid:");
                ui.add(egui::DragValue::new(&mut self.config.grid_nx).range(2..=2000));
                ui.label("x");
                ui.add(egui::DragValue::new(&mut self.config.grid_ny).range(2..=2000));
            });
            ui.horizontal(|ui| {
                ui.label("Palette:");
                egui::ComboBox::from_id_salt("palette")
                    .selected_text(self.config.palette.name())
                    .show_ui(ui, |ui| {
                        for palette in Palette::ALL {
                            ui.selectable_value(&mut self.config.palette, palette, palette.name());
                        }
                    });
            });
            ui.horizontal(|ui| {
                ui.label("Cell:");
                ui.text_edit_singleline(&mut self.cell_name_input)
                    .on_hover_text("Leave empty to use the last cell in the library");
            });
            ui.horizontal(|ui| {
                ui.label("Pixels per cell:");
                ui.add(egui::DragValue::new(&mut self.config.scale).range(1..=8));
            });

            let busy = matches!(self.loading_state, LoadingState::Loading { .. });
            if ui
                .add_enabled(!busy, egui::Button::new("Generate Heatmap"))
                .clicked()
            {
                self.start_heatmap_generation();
            }

            if let Some(run) = &self.run {
                ui.separator();
                ui.heading("Result");
                ui.label(format!("Cell: {}", run.cell.name));
                ui.label(format!("Polygons: {}", run.cell.polygons.len()));
                ui.label(format!("Merged samples: {}", run.merge.samples.len()));
                ui.label(format!(
                    "Unmatched: {} coordinate-only, {} voltage-only, {} undefined",
                    run.merge.report.coordinate_only.len(),
                    run.merge.report.voltage_only.len(),
                    run.merge.report.undefined.len()
                ));
                ui.label(format!(
                    "Measured range: {:.4} .. {:.4} {}",
                    run.heatmap.legend.vmin, run.heatmap.legend.vmax, run.heatmap.legend.unit
                ));
                if let Some((lo, hi)) = run.field.value_range() {
                    ui.label(format!("Interpolated range: {lo:.4} .. {hi:.4} V"));
                }

                if self.show_samples {
                    ui.separator();
                    ui.label("Merged Samples:");
                    let samples = &run.merge.samples;
                    TableBuilder::new(ui)
                        .striped(true)
                        .resizable(false)
                        .max_scroll_height(300.0)
                        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                        .column(Column::remainder().at_least(80.0)) // Node
                        .column(Column::exact(70.0)) // X
                        .column(Column::exact(70.0)) // Y
                        .column(Column::exact(70.0)) // Voltage
                        .header(20.0, |mut header| {
                            header.col(|ui| {
                                ui.strong("Node");
                            });
                            header.col(|ui| {
                                ui.strong("X");
                            });
                            header.col(|ui| {
                                ui.strong("Y");
                            });
                            header.col(|ui| {
                                ui.strong("Voltage");
                            });
                        })
                        .body(|body| {
                            body.rows(18.0, samples.len(), |mut row| {
                                let sample = &samples[row.index()];
                                row.col(|ui| {
                                    ui.label(&sample.label);
                                });
                                row.col(|ui| {
                                    ui.label(format!("{:.3}", sample.x));
                                });
                                row.col(|ui| {
                                    ui.label(format!("{:.3}", sample.y));
                                });
                                row.col(|ui| {
                                    ui.label(format!("{:.4}", sample.voltage));
                                });
                            });
                        });
                }
            }
        });
    }

    fn render_legend(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(run) = &self.run else { return };
        let legend = &run.heatmap.legend;

        let bar = egui::Rect::from_min_size(
            egui::pos2(rect.right() - 90.0, rect.top() + 20.0),
            egui::vec2(16.0, (rect.height() - 40.0).clamp(40.0, 300.0)),
        );
        let slice_height = bar.height() / LEGEND_SLICES as f32;
        for k in 0..LEGEND_SLICES {
            let t = 1.0 - (k as f64 + 0.5) / LEGEND_SLICES as f64;
            let [r, g, b, _] = legend.palette.color(t);
            let slice = egui::Rect::from_min_size(
                egui::pos2(bar.left(), bar.top() + k as f32 * slice_height),
                egui::vec2(bar.width(), slice_height + 0.5),
            );
            painter.rect_filled(slice, 0.0, egui::Color32::from_rgb(r, g, b));
        }
        painter.rect_stroke(
            bar,
            0.0,
            egui::Stroke::new(1.0, egui::Color32::WHITE),
            egui::StrokeKind::Middle,
        );

        for tick in &legend.ticks {
            let t = legend.normalize(tick.value) as f32;
            let y = bar.bottom() - t * bar.height();
            painter.line_segment(
                [egui::pos2(bar.right(), y), egui::pos2(bar.right() + 4.0, y)],
                egui::Stroke::new(1.0, egui::Color32::WHITE),
            );
            painter.text(
                egui::pos2(bar.right() + 6.0, y),
                egui::Align2::LEFT_CENTER,
                &tick.label,
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
        }
        painter.text(
            egui::pos2(bar.center().x, bar.top() - 4.0),
            egui::Align2::CENTER_BOTTOM,
            format!("Voltage ({})", legend.unit),
            egui::FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
    }

    fn render_visualization(&mut self, ui: &mut egui::Ui) {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, egui::Sense::drag());

        if self.fit_to_view_requested || ui.input(|i| i.key_pressed(egui::Key::F)) {
            self.fit_to_view(available_size);
            self.fit_to_view_requested = false;
        }

        if response.dragged() {
            let delta = response.drag_delta();
            self.pan_x += delta.x;
            self.pan_y += delta.y;
        }

        // Zoom around the mouse position
        if let Some(hover_pos) = response.hover_pos() {
            let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
            if scroll_delta != 0.0 {
                let zoom_factor = if scroll_delta > 0.0 { 1.1 } else { 0.9 };
                let center = response.rect.center();
                let world_x = (hover_pos.x - center.x - self.pan_x) / self.zoom;
                let world_y = (hover_pos.y - center.y - self.pan_y) / self.zoom;
                self.zoom = (self.zoom * zoom_factor).clamp(1e-6, 1e6);
                self.pan_x = hover_pos.x - center.x - world_x * self.zoom;
                self.pan_y = hover_pos.y - center.y - world_y * self.zoom;
            }
        }

        let rect = response.rect;
        let center = rect.center();
        painter.rect_filled(rect, 0.0, egui::Color32::from_gray(32));

        let Some(run) = &self.run else {
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                "Select a GDS file and both measurement tables, then Generate Heatmap",
                egui::FontId::proportional(16.0),
                egui::Color32::GRAY,
            );
            return;
        };

        if let Some(texture) = &self.texture {
            let heatmap = &run.heatmap;
            let extent = heatmap.extent;
            let image_rect = egui::Rect::from_min_max(
                self.to_screen(center, extent.xmin, extent.ymax),
                self.to_screen(center, extent.xmax, extent.ymin),
            );
            // Only the field part of the texture, not the colorbar strip
            let uv = egui::Rect::from_min_max(
                egui::pos2(0.0, 0.0),
                egui::pos2(heatmap.field_width as f32 / heatmap.image.width() as f32, 1.0),
            );
            painter.image(texture.id(), image_rect, uv, egui::Color32::WHITE);
        }

        if self.show_outlines {
            for polygon in &run.cell.polygons {
                let points: Vec<egui::Pos2> = polygon
                    .points()
                    .iter()
                    .map(|p| self.to_screen(center, p.x, p.y))
                    .collect();
                painter.add(egui::Shape::Path(PathShape::closed_line(
                    points,
                    PathStroke::new(1.0, egui::Color32::WHITE),
                )));
            }
        }

        if self.show_legend {
            self.render_legend(&painter, rect);
        }
    }
}

impl eframe::App for HeatmapViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_loading_progress(ctx);

        if let Some(error) = &self.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.colored_label(egui::Color32::from_rgb(244, 67, 54), error);
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.allocate_space(egui::Vec2::new(ui.available_width() / 2.0 - 25.0, 0.0));
                        if ui.button("OK").clicked() {
                            self.error_message = None;
                        }
                    });
                });
        }

        if let Some(success) = &self.success_message.clone() {
            egui::Window::new("Success")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.colored_label(egui::Color32::from_rgb(76, 175, 80), success);
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.allocate_space(egui::Vec2::new(ui.available_width() / 2.0 - 25.0, 0.0));
                        if ui.button("OK").clicked() {
                            self.success_message = None;
                        }
                    });
                });
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui);
        });

        if let LoadingState::Loading {
            file_name,
            start_time,
            show_progress,
        } = &self.loading_state
        {
            if *show_progress {
                egui::TopBottomPanel::top("loading_bar").show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(format!("Generating heatmap for {}", file_name));
                        ui.label(format!("({:.1}s)", start_time.elapsed().as_secs_f32()));
                    });
                });
            }
        }

        egui::SidePanel::left("left_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_left_panel(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("IR Drop Heatmap");
            self.render_visualization(ui);
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.config);
    }
}
