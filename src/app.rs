use std::path::PathBuf;

use egui::{Color32, Pos2, Rect, TextureHandle};

use crate::command::CommandHistory;
use crate::document::Document;
use crate::file_io::{self, FileKind, Opened};
use crate::settings::Settings;
use crate::stroke::{MutableStroke, Point, Rgba, Stroke};

const PALETTE: [(&str, Rgba); 5] = [
    ("Black", Rgba::BLACK),
    ("Blue", Rgba::BLUE),
    ("Green", Rgba::GREEN),
    ("Red", Rgba::RED),
    ("Orange", Rgba::ORANGE),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tool {
    Pen,
    Eraser,
}

/// Dialogs waiting for the user.
enum Pending {
    None,
    /// Flattening export of the path in the text field.
    ConfirmExport,
    /// Image with embedded strokes; restore them or open as a picture.
    ConfirmRestore(Opened),
}

pub struct PaintApp {
    document: Document,
    history: CommandHistory,
    settings: Settings,
    settings_path: Option<PathBuf>,
    tool: Tool,
    current_stroke: Option<MutableStroke>,
    /// Strokes as they were when the current eraser drag started.
    erase_before: Option<Vec<Stroke>>,
    background: Option<TextureHandle>,
    file_path: String,
    status: String,
    pending: Pending,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings_path = Settings::default_path();
        let settings = settings_path
            .as_deref()
            .map(Settings::load)
            .unwrap_or_default();

        Self {
            document: Document::new(),
            history: CommandHistory::new(),
            settings,
            settings_path,
            tool: Tool::Pen,
            current_stroke: None,
            erase_before: None,
            background: None,
            file_path: "drawing.isf".to_owned(),
            status: String::new(),
            pending: Pending::None,
        }
    }

    fn save_settings(&mut self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        // A failed settings save must not interrupt drawing.
        if let Err(err) = self.settings.save(path) {
            log::warn!("Failed to save settings: {}", err);
        }
    }

    fn undo(&mut self) {
        self.history.undo(&mut self.document);
    }

    fn redo(&mut self) {
        self.history.redo(&mut self.document);
    }

    fn save(&mut self) {
        let path = PathBuf::from(self.file_path.trim());
        match FileKind::from_path(&path) {
            Ok(FileKind::Project) => {
                self.report(file_io::save_project(&path, self.document.strokes()), "Saved");
            }
            Ok(FileKind::Raster(_)) => self.pending = Pending::ConfirmExport,
            Err(err) => self.status = err.to_string(),
        }
    }

    fn export(&mut self) {
        let path = PathBuf::from(self.file_path.trim());
        let result = file_io::export_image(&path, self.document.strokes(), &self.settings);
        self.report(result, "Exported");
    }

    fn open(&mut self, ctx: &egui::Context) {
        let path = PathBuf::from(self.file_path.trim());
        match file_io::open(&path) {
            Ok(opened) if opened.has_history() => self.pending = Pending::ConfirmRestore(opened),
            Ok(opened) => self.load_opened(ctx, opened, false),
            Err(err) => {
                log::error!("Failed to open {}: {}", path.display(), err);
                self.status = format!("Error opening file: {err}");
            }
        }
    }

    fn load_opened(&mut self, ctx: &egui::Context, opened: Opened, restore_history: bool) {
        if restore_history {
            match opened.history() {
                Ok(Some(strokes)) => {
                    self.set_strokes(strokes);
                    self.background = None;
                    self.status = format!("Restored {} strokes", self.document.len());
                    return;
                }
                Ok(None) => {}
                Err(err) => {
                    log::error!("Embedded history is corrupt: {}", err);
                    self.status = format!("Embedded history is corrupt ({err}), opened as a picture");
                }
            }
        }

        match opened {
            Opened::Project(strokes) => {
                self.set_strokes(strokes);
                self.background = None;
                self.status = format!("Opened {} strokes", self.document.len());
            }
            Opened::Raster { image, .. } => {
                let size = [image.width() as usize, image.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                self.background =
                    Some(ctx.load_texture("background", color_image, egui::TextureOptions::default()));
                self.set_strokes(Vec::new());
                if self.status.is_empty() || !restore_history {
                    self.status = "Opened image".to_owned();
                }
            }
        }
    }

    fn set_strokes(&mut self, strokes: Vec<Stroke>) {
        self.document.replace(strokes);
        self.history.reset();
    }

    fn report(&mut self, result: crate::error::FileResult<()>, done: &str) {
        self.status = match result {
            Ok(()) => format!("{done} {}", self.file_path.trim()),
            Err(err) => {
                log::error!("{} failed: {}", done, err);
                format!("Error: {err}")
            }
        };
    }

    fn toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tool, Tool::Pen, "Pen");
            ui.selectable_value(&mut self.tool, Tool::Eraser, "Eraser");
            ui.separator();
            for (name, color) in PALETTE {
                if ui
                    .selectable_label(self.settings.brush_color == color, name)
                    .clicked()
                {
                    self.settings.brush_color = color;
                    self.save_settings();
                }
            }
            ui.separator();
            let size = ui.add(egui::Slider::new(&mut self.settings.brush_width, 1.0..=50.0).text("Size"));
            let eraser = ui.add(egui::Slider::new(&mut self.settings.eraser_radius, 1.0..=50.0).text("Eraser"));
            if size.drag_stopped() || size.lost_focus() || eraser.drag_stopped() || eraser.lost_focus() {
                self.save_settings();
            }
            ui.separator();
            if ui.button("Undo").clicked() {
                self.undo();
            }
            if ui.button("Redo").clicked() {
                self.redo();
            }
            if ui.button("Clear").clicked() {
                self.history.clear(&mut self.document);
                self.background = None;
            }
        });

        ui.horizontal(|ui| {
            ui.label("File:");
            ui.text_edit_singleline(&mut self.file_path);
            if ui.button("Save").clicked() {
                self.save();
            }
            if ui.button("Open").clicked() {
                self.open(ctx);
            }
            ui.separator();
            let mut changed = ui.checkbox(&mut self.settings.snap_enabled, "Snap").changed();
            let snap = ui.add(egui::Slider::new(&mut self.settings.snap_threshold, 0.0..=50.0).text("Snap distance"));
            changed |= snap.drag_stopped() || snap.lost_focus();
            let mut beta = self.settings.beta_mode_enabled;
            if ui.checkbox(&mut beta, "Beta").changed() {
                self.settings.set_beta_mode(beta);
                changed = true;
            }
            ui.add_enabled_ui(self.settings.beta_mode_enabled, |ui| {
                changed |= ui
                    .checkbox(&mut self.settings.experimental_history_export_enabled, "Embed history in images")
                    .changed();
            });
            if changed {
                self.save_settings();
            }
        });

        if !self.status.is_empty() {
            ui.label(self.status.as_str());
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        painter.rect_filled(rect, 0.0, Color32::WHITE);

        if let Some(texture) = &self.background {
            let size = texture.size_vec2();
            let uv = Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0));
            painter.image(texture.id(), Rect::from_min_size(rect.min, size), uv, Color32::WHITE);
        }

        // A drag only registers once the pointer has moved; start it where the button went down.
        let press_origin = ui.input(|i| i.pointer.press_origin());
        match self.tool {
            Tool::Pen => self.pen_input(&response, press_origin),
            Tool::Eraser => self.eraser_input(&response, press_origin),
        }

        for stroke in self.document.strokes() {
            paint_stroke(&painter, rect.min, stroke.points(), stroke.color(), stroke.width());
        }
        if let Some(stroke) = &self.current_stroke {
            paint_stroke(&painter, rect.min, stroke.points(), stroke.color(), stroke.width());
        }
        if self.tool == Tool::Eraser {
            if let Some(pos) = response.hover_pos() {
                let outline = egui::Stroke::new(1.0, Color32::GRAY);
                painter.circle_stroke(pos, self.settings.eraser_radius as f32, outline);
            }
        }
    }

    fn pen_input(&mut self, response: &egui::Response, press_origin: Option<Pos2>) {
        let origin = response.rect.min;
        if response.drag_started() {
            let mut stroke = MutableStroke::new(self.settings.brush_color, self.settings.brush_width);
            if let Some(pos) = press_origin {
                stroke.add_point(to_canvas(origin, pos));
            }
            self.current_stroke = Some(stroke);
        }
        if let (Some(stroke), Some(pos)) = (&mut self.current_stroke, response.interact_pointer_pos()) {
            stroke.add_point(to_canvas(origin, pos));
        }
        if response.drag_stopped() {
            if let Some(stroke) = self.current_stroke.take().and_then(MutableStroke::finish) {
                let engine = self.settings.snap_engine();
                self.history.commit_stroke(stroke, &engine, &mut self.document);
            }
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let dot = dot_stroke(&self.settings, to_canvas(origin, pos));
                let engine = self.settings.snap_engine();
                self.history.commit_stroke(dot, &engine, &mut self.document);
            }
        }
    }

    fn eraser_input(&mut self, response: &egui::Response, press_origin: Option<Pos2>) {
        let origin = response.rect.min;
        let eraser = self.settings.eraser();
        if response.drag_started() {
            self.erase_before = Some(self.document.strokes().to_vec());
            if let Some(pos) = press_origin {
                self.document.erase(&eraser, to_canvas(origin, pos).xy());
            }
        }
        if self.erase_before.is_some() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.document.erase(&eraser, to_canvas(origin, pos).xy());
            }
        }
        if response.drag_stopped() {
            if let Some(before) = self.erase_before.take() {
                self.history.record_erase(before, &self.document);
            }
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let before = self.document.strokes().to_vec();
                if self.document.erase(&eraser, to_canvas(origin, pos).xy()) {
                    self.history.record_erase(before, &self.document);
                }
            }
        }
    }

    fn dialogs(&mut self, ctx: &egui::Context) {
        match std::mem::replace(&mut self.pending, Pending::None) {
            Pending::None => {}
            Pending::ConfirmExport => {
                let mut answer = None;
                egui::Window::new("Export Warning")
                    .collapsible(false)
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.label("Exporting as an image will flatten everything.");
                        if !self.settings.history_export_available() {
                            ui.label("You will NOT be able to undo or edit strokes if you open this file later.");
                            ui.label("Save as .isf to keep the drawing editable.");
                        }
                        ui.horizontal(|ui| {
                            if ui.button("Export").clicked() {
                                answer = Some(true);
                            }
                            if ui.button("Cancel").clicked() {
                                answer = Some(false);
                            }
                        });
                    });
                match answer {
                    Some(true) => self.export(),
                    Some(false) => {}
                    None => self.pending = Pending::ConfirmExport,
                }
            }
            Pending::ConfirmRestore(opened) => {
                let mut answer = None;
                egui::Window::new("Drawing History Found")
                    .collapsible(false)
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.label("This image contains embedded strokes. Restore them as editable strokes?");
                        ui.horizontal(|ui| {
                            if ui.button("Restore strokes").clicked() {
                                answer = Some(true);
                            }
                            if ui.button("Open as picture").clicked() {
                                answer = Some(false);
                            }
                        });
                    });
                match answer {
                    Some(restore) => {
                        self.status.clear();
                        self.load_opened(ctx, opened, restore);
                    }
                    None => self.pending = Pending::ConfirmRestore(opened),
                }
            }
        }
    }
}

fn to_canvas(origin: Pos2, pos: Pos2) -> Point {
    Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64)
}

/// The stroke left by a click without any drag.
fn dot_stroke(settings: &Settings, point: Point) -> Stroke {
    Stroke::new(settings.brush_color, settings.brush_width, vec![point])
}

fn paint_stroke(painter: &egui::Painter, origin: Pos2, points: &[Point], color: Rgba, width: f64) {
    let color = Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a);
    let screen: Vec<Pos2> = points
        .iter()
        .map(|p| egui::pos2(origin.x + p.x as f32, origin.y + p.y as f32))
        .collect();
    match screen.len() {
        0 => {}
        1 => {
            painter.circle_filled(screen[0], (width / 2.0) as f32, color);
        }
        _ => {
            painter.add(egui::Shape::line(screen, egui::Stroke::new(width as f32, color)));
        }
    }
}

impl eframe::App for PaintApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z)) {
            self.undo();
        }
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y)) {
            self.redo();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ctx, ui));
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.canvas(ui));
        self.dialogs(ctx);
    }
}
