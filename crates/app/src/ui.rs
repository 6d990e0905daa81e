use eframe::egui::{self, pos2, vec2, Align2, Color32, FontId, Sense, Stroke, Ui};
use treeheat_core::color::Rgb;
use treeheat_core::scanner::{HeatMetric, WeightMetric};
use treeheat_core::{ColorMode, Frame, Rect as Bounds, Surface, TextMeasure, TreemapConfig};

use crate::state::AppState;

pub fn draw(app: &mut AppState, ctx: &egui::Context) {
    if app.poll_scan() {
        ctx.request_repaint();
    }

    // Ensure the UI keeps repainting during active scans
    if app.is_scanning() {
        ctx.request_repaint();
    }

    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        top_bar(ui, app);
    });

    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        status_bar(ui, app);
    });

    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| treemap(ui, app));
}

fn top_bar(ui: &mut Ui, app: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("Open dataset").clicked() {
            if let Some(path) = rfd::FileDialog::new().add_filter("json", &["json"]).pick_file() {
                app.open_dataset(&path);
            }
        }
        if ui.button("Scan folder").clicked() {
            if let Some(path) = rfd::FileDialog::new().pick_folder() {
                app.start_scan(path);
            }
        }
        egui::ComboBox::from_id_source("weight")
            .selected_text(match app.scan_options.weight {
                WeightMetric::Bytes => "Bytes",
                WeightMetric::Lines => "Lines",
            })
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.scan_options.weight, WeightMetric::Bytes, "Bytes");
                ui.selectable_value(&mut app.scan_options.weight, WeightMetric::Lines, "Lines");
            });
        egui::ComboBox::from_id_source("heat")
            .selected_text(match app.scan_options.heat {
                HeatMetric::None => "No heat",
                HeatMetric::Age => "Age",
                HeatMetric::Frequency => "Commit frequency",
                HeatMetric::LocChanges => "Lines changed",
            })
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.scan_options.heat, HeatMetric::None, "No heat");
                ui.selectable_value(&mut app.scan_options.heat, HeatMetric::Age, "Age");
                ui.selectable_value(&mut app.scan_options.heat, HeatMetric::Frequency, "Commit frequency");
                ui.selectable_value(&mut app.scan_options.heat, HeatMetric::LocChanges, "Lines changed");
            });
        if app.is_scanning() {
            let label = if app.is_paused() { "Resume" } else { "Pause" };
            if ui.button(label).clicked() {
                app.toggle_pause();
            }
            if ui.button("Cancel").clicked() {
                app.cancel_scan();
            }
        }

        ui.separator();
        ui.label("Color:");
        let mut mode = app.config.color_mode;
        egui::ComboBox::from_id_source("color")
            .selected_text(match mode {
                ColorMode::Heat => "Heat",
                ColorMode::RelativeSize => "Relative size",
            })
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut mode, ColorMode::Heat, "Heat");
                ui.selectable_value(&mut mode, ColorMode::RelativeSize, "Relative size");
            });
        if mode != app.config.color_mode {
            let config = TreemapConfig {
                color_mode: mode,
                ..app.config.clone()
            };
            app.set_config(config);
        }

        ui.separator();
        ui.label("Find:");
        let edit = ui.text_edit_singleline(&mut app.search);
        if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            app.jump_to();
        }
    });
}

fn status_bar(ui: &mut Ui, app: &AppState) {
    ui.horizontal(|ui| {
        if let Some(source) = &app.source {
            ui.label(source.display().to_string());
        } else {
            ui.label("Open a dataset or scan a folder to start");
        }
        if app.is_scanning() {
            let p = app.progress;
            let fraction = if p.discovered > 0 {
                (p.scanned as f32 / p.discovered as f32).clamp(0.0, 1.0)
            } else {
                0.0
            };
            ui.add(
                egui::ProgressBar::new(fraction)
                    .desired_width(240.0)
                    .text(format!("Scanning… {} files", p.scanned)),
            );
        }
        if app.scan_errors > 0 {
            ui.label(format!("{} unreadable", app.scan_errors));
        }
        if let Some(status) = &app.status {
            ui.colored_label(Color32::RED, status);
        }
    });
}

fn treemap(ui: &mut Ui, app: &mut AppState) {
    let area = ui.available_rect_before_wrap();
    let response = ui.allocate_rect(area, Sense::click());
    let Some(session) = &mut app.session else {
        return;
    };

    let frame = {
        let mut surface = PainterSurface {
            painter: ui.painter_at(area),
            config: session.config(),
        };
        let viewport = Bounds::new(
            f64::from(area.min.x),
            f64::from(area.min.y),
            f64::from(area.width()),
            f64::from(area.height()),
        );
        session.render_into(&mut surface, viewport)
    };

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = (f64::from(pos.x), f64::from(pos.y));
            if frame.in_toolbar(x, y) {
                session.collapse();
            } else if let Some(view) = frame.hit_test(x, y) {
                session.expand(view.id);
            }
        }
    }
    if response.secondary_clicked() {
        session.collapse();
    }

    let hovered = response
        .hover_pos()
        .and_then(|pos| frame.hit_test(f64::from(pos.x), f64::from(pos.y)))
        .and_then(|view| session.tooltip(view.id));
    if let Some(lines) = hovered {
        response.on_hover_ui_at_pointer(|ui| {
            for line in lines {
                ui.label(line);
            }
        });
    }
}

struct PainterSurface<'a> {
    painter: egui::Painter,
    config: &'a TreemapConfig,
}

fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

fn to_egui(r: &Bounds) -> egui::Rect {
    egui::Rect::from_min_size(pos2(r.x as f32, r.y as f32), vec2(r.w as f32, r.h as f32))
}

impl TextMeasure for PainterSurface<'_> {
    fn measure(&self, text: &str, font_size: f64, _font_family: &str) -> f64 {
        let galley = self.painter.layout_no_wrap(
            text.to_owned(),
            FontId::proportional(font_size as f32),
            Color32::BLACK,
        );
        f64::from(galley.size().x)
    }
}

impl Surface for PainterSurface<'_> {
    fn draw(&mut self, frame: &Frame) {
        let cfg = self.config;
        let bar = to_egui(&frame.toolbar);
        self.painter.rect_filled(bar, 0.0, color(frame.toolbar_shade.fill.to_rgb()));
        self.painter.text(
            pos2(bar.min.x + cfg.margin as f32, bar.center().y),
            Align2::LEFT_CENTER,
            &frame.trail,
            FontId::proportional(cfg.font_size as f32),
            color(frame.toolbar_shade.foreground),
        );

        for n in &frame.nodes {
            let rect = to_egui(&n.rect);
            self.painter.rect_filled(rect, 0.0, color(n.shade.fill.to_rgb()));
            self.painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::WHITE));
            if n.fit.visible && !n.label.is_empty() {
                let (x, y) = n.fit.anchor(&n.rect, cfg);
                self.painter.text(
                    pos2(x as f32, y as f32),
                    Align2::LEFT_BOTTOM,
                    &n.label,
                    FontId::proportional(n.fit.font_size(cfg) as f32),
                    color(n.shade.foreground),
                );
            }
        }
    }
}
