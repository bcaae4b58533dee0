use eframe::egui::{self, Color32, Pos2, Stroke};
use egui_phosphor::regular as ph;
use kgraph_canvas::{DrawCommand, ExploredGraph, ExplorerView, ForceParams, FrameToken};
use kgraph_core::{Vec2, ViewTransform};

use crate::theme::to_color32;

/// Nominal refresh rate the layout constants were tuned for.
const FRAMES_PER_SECOND: f32 = 60.0;
/// Largest step taken after a stall, in frames.
const MAX_FRAME_STEP: f32 = 3.0;
const GRADIENT_RINGS: usize = 6;

pub struct ExplorerWindow {
    view: ExplorerView,
    token: Option<FrameToken>,
    open: bool,
}

impl ExplorerWindow {
    pub fn new(params: ForceParams) -> Self {
        Self {
            view: ExplorerView::new(params),
            token: None,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_params(&mut self, params: ForceParams) {
        self.view.set_params(params);
    }

    pub fn open(&mut self, graph: ExploredGraph, viewport: Vec2) {
        let mut rng = rand::rng();
        self.token = Some(self.view.load(graph, viewport, &mut rng));
        self.open = true;
    }

    pub fn close(&mut self) {
        self.view.close();
        self.token = None;
        self.open = false;
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.open {
            return;
        }

        let mut open = self.open;
        egui::Window::new(format!("{} Explorer", ph::SHARE_NETWORK))
            .open(&mut open)
            .default_size([720.0, 480.0])
            .resizable(true)
            .show(ctx, |ui| {
                self.details_panel(ui);
                egui::CentralPanel::default().show_inside(ui, |ui| {
                    self.canvas(ui);
                });
            });

        if !open {
            tracing::debug!("Explorer window closed");
            self.close();
            return;
        }

        // Self-rescheduling frame: keep ticking until the loop is cancelled.
        if let Some(token) = self.token {
            let dt = ctx.input(|i| i.stable_dt * FRAMES_PER_SECOND).min(MAX_FRAME_STEP);
            if self.view.tick(token, dt) {
                ctx.request_repaint();
            } else {
                self.token = None;
            }
        }
    }

    fn details_panel(&self, ui: &mut egui::Ui) {
        egui::SidePanel::right("explorer_details")
            .resizable(true)
            .default_width(200.0)
            .show_inside(ui, |ui| {
                let Some(node) = self.view.selected_details() else {
                    ui.weak("Click a node to inspect it.");
                    return;
                };
                ui.heading(node.display_name());
                ui.horizontal_wrapped(|ui| {
                    for label in &node.labels {
                        ui.label(egui::RichText::new(label).strong());
                    }
                });
                ui.separator();
                egui::Grid::new("explorer_properties")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for (key, value) in &node.properties {
                            ui.label(key.as_str());
                            let text = match value {
                                serde_json::Value::String(s) => s.clone(),
                                other => other.to_string(),
                            };
                            ui.label(text);
                            ui.end_row();
                        }
                    });
            });
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let origin = rect.min.to_vec2();
        let local = |p: Pos2| Vec2::new(p.x - origin.x, p.y - origin.y);

        self.view.set_viewport(Vec2::new(rect.width(), rect.height()));

        let (pressed, released, latest, moved, scroll) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.pointer.delta() != egui::Vec2::ZERO,
                i.raw_scroll_delta.y,
            )
        });

        if pressed
            && response.hovered()
            && let Some(pos) = latest
        {
            self.view.pointer_down(local(pos));
        }
        match latest {
            Some(pos) if moved => self.view.pointer_move(local(pos)),
            None => self.view.pointer_leave(),
            _ => {}
        }
        if released {
            self.view.pointer_up();
        }
        // egui's positive scroll means "up", i.e. zoom in.
        if response.hovered()
            && scroll != 0.0
            && let Some(pos) = latest
        {
            self.view.wheel(local(pos), -scroll);
        }

        let painter = ui.painter_at(rect);
        paint(&painter, origin, &self.view.draw_commands());
    }
}

fn paint(painter: &egui::Painter, origin: egui::Vec2, commands: &[DrawCommand]) {
    let mut view = ViewTransform::IDENTITY;
    let to_screen = |view: &ViewTransform, p: Vec2| {
        let s = view.world_to_screen(p);
        Pos2::new(s.x, s.y) + origin
    };

    for command in commands {
        match command {
            DrawCommand::Clear(color) => {
                painter.rect_filled(painter.clip_rect(), 0.0, to_color32(*color));
            }
            DrawCommand::Transform(transform) => view = *transform,
            DrawCommand::Line { from, to, color, width } => {
                painter.line_segment(
                    [to_screen(&view, *from), to_screen(&view, *to)],
                    Stroke::new(width * view.zoom, to_color32(*color)),
                );
            }
            DrawCommand::Circle { center, radius, inner, outer, stroke } => {
                let center = to_screen(&view, *center);
                let radius = radius * view.zoom;
                // egui has no radial gradient; approximate with shrinking rings.
                for ring in 0..GRADIENT_RINGS {
                    let t = ring as f32 / GRADIENT_RINGS as f32;
                    let color = lerp_color(to_color32(*outer), to_color32(*inner), t);
                    painter.circle_filled(center, radius * (1.0 - t * 0.8), color);
                }
                if let Some(stroke) = stroke {
                    let stroke = Stroke::new(2.5, to_color32(*stroke));
                    painter.circle_stroke(center, radius + 2.0, stroke);
                }
            }
            DrawCommand::Text { center, lines, color, size } => {
                let font = egui::FontId::proportional(size * view.zoom);
                let line_height = size * view.zoom * 1.2;
                let anchor = to_screen(&view, *center);
                let top = anchor.y - line_height * (lines.len() as f32 - 1.0) / 2.0;
                let x = anchor.x;
                for (i, line) in lines.iter().enumerate() {
                    painter.text(
                        Pos2::new(x, top + i as f32 * line_height),
                        egui::Align2::CENTER_CENTER,
                        line,
                        font.clone(),
                        to_color32(*color),
                    );
                }
            }
        }
    }
}

fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        mix(a.r(), b.r()),
        mix(a.g(), b.g()),
        mix(a.b(), b.b()),
        mix(a.a(), b.a()),
    )
}
