use eframe::egui::{self, Color32, Pos2, Stroke};
use egui::epaint::CubicBezierShape;
use kgraph_canvas::style::{
    COLOR_EDGE, COLOR_EDGE_PENDING, COLOR_EDGE_SELECTED, COLOR_HANDLE, node_colors,
};
use kgraph_canvas::{
    CanvasController, CanvasSnapshot, EdgeGeometry, EdgeLayout, EditorDocument, HitTester,
    PointerEvent, PointerId,
};
use kgraph_core::{EditorNode, HANDLE_RADIUS, Vec2, ViewTransform};
use kgraph_events::EventBus;

use crate::settings::CanvasSettings;
use crate::theme::{CanvasPalette, to_color32};

/// egui exposes a single mouse pointer.
const MOUSE: PointerId = 0;
const GRID_SPACING: f32 = 40.0;
const LINE_SCROLL_POINTS: f32 = 40.0;
const NODE_CORNER_RADIUS: f32 = 8.0;

/// Input gathered from one frame, in client (window) coordinates.
#[derive(Default)]
struct FrameInput {
    pressed: Option<Vec2>,
    moved: Option<Vec2>,
    released: Option<Vec2>,
    gone: bool,
    escape: bool,
    delete: bool,
    wheel: Vec<(Vec2, bool)>,
}

pub struct EditorCanvas {
    controller: CanvasController,
    hit_tester: HitTester,
}

impl EditorCanvas {
    pub fn new(settings: &CanvasSettings) -> Self {
        Self {
            controller: CanvasController::with_pan_zoom(settings.pan_zoom()),
            hit_tester: HitTester::with_tolerance(settings.edge_hit_tolerance),
        }
    }

    pub fn apply_settings(&mut self, settings: &CanvasSettings) {
        if self.controller.state().is_idle() {
            self.controller = CanvasController::with_pan_zoom(settings.pan_zoom());
        }
        self.hit_tester.set_edge_tolerance(settings.edge_hit_tolerance);
    }

    /// Draw `doc` and translate this frame's input into callbacks on `bus`.
    /// Returns the canvas size so "fit to content" knows the viewport.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        doc: &EditorDocument,
        bus: &mut EventBus,
        settings: &CanvasSettings,
        palette: &CanvasPalette,
    ) -> Vec2 {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let origin = Vec2::new(rect.min.x, rect.min.y);
        let snapshot = doc.snapshot(origin);
        let geometry = EdgeLayout::layout(doc.nodes(), doc.edges());
        self.hit_tester.update(doc.nodes(), &geometry);

        let input = self.gather_input(ui, &response, rect);
        self.handle_input(&snapshot, input, bus);

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, palette.background);
        if settings.show_grid {
            draw_grid(&painter, rect, snapshot.view, palette.grid);
        }
        for edge in &geometry {
            self.draw_edge(&painter, &snapshot, doc, edge, settings, palette);
        }
        if let Some((start, end)) = self.controller.pending_connection() {
            let from = to_screen(&snapshot, start);
            let to = to_screen(&snapshot, end);
            painter.line_segment([from, to], Stroke::new(2.0, to_color32(COLOR_EDGE_PENDING)));
        }
        for node in doc.nodes() {
            let selected = doc.selected_node() == Some(&node.id);
            draw_node(&painter, &snapshot, node, selected);
        }

        Vec2::new(rect.width(), rect.height())
    }

    fn gather_input(
        &self,
        ui: &egui::Ui,
        response: &egui::Response,
        rect: egui::Rect,
    ) -> FrameInput {
        let hovered = response.hovered();
        let keyboard_free = !ui.ctx().wants_keyboard_input();
        ui.input(|i| {
            let latest = i.pointer.latest_pos().map(|p| Vec2::new(p.x, p.y));
            let mut input = FrameInput {
                gone: latest.is_none(),
                escape: i.key_pressed(egui::Key::Escape),
                delete: hovered
                    && keyboard_free
                    && (i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)),
                ..FrameInput::default()
            };
            if i.pointer.primary_pressed() && hovered {
                input.pressed = i.pointer.interact_pos().map(|p| Vec2::new(p.x, p.y));
            }
            if i.pointer.delta() != egui::Vec2::ZERO {
                input.moved = latest;
            }
            if i.pointer.primary_released() {
                input.released = latest;
            }
            if hovered {
                for event in &i.events {
                    if let egui::Event::MouseWheel {
                        unit,
                        delta,
                        modifiers,
                        ..
                    } = event
                    {
                        let scale = match unit {
                            egui::MouseWheelUnit::Point => 1.0,
                            egui::MouseWheelUnit::Line => LINE_SCROLL_POINTS,
                            egui::MouseWheelUnit::Page => rect.height(),
                        };
                        // egui reports "scroll up" as positive; the canvas expects
                        // positive values to scroll down.
                        let delta = Vec2::new(-delta.x * scale, -delta.y * scale);
                        input.wheel.push((delta, modifiers.command || modifiers.ctrl));
                    }
                }
            }
            input
        })
    }

    fn handle_input(
        &mut self,
        snapshot: &CanvasSnapshot<'_>,
        input: FrameInput,
        bus: &mut EventBus,
    ) {
        if let Some(pos) = input.pressed {
            self.controller.pointer_down_at(
                snapshot,
                PointerEvent::new(MOUSE, pos.x, pos.y),
                &self.hit_tester,
                bus,
            );
        }
        if let Some(pos) = input.moved {
            self.controller
                .pointer_move(snapshot, PointerEvent::new(MOUSE, pos.x, pos.y), bus);
        }
        if let Some(pos) = input.released {
            let event = PointerEvent::new(MOUSE, pos.x, pos.y);
            if let Some(node) = self.hit_tester.hit_test_node(snapshot.to_world(event.client)) {
                self.controller.node_pointer_up(&node, event, bus);
            }
            self.controller
                .pointer_up(snapshot, event, &self.hit_tester, bus);
        }
        if input.gone {
            self.controller.pointer_leave(PointerEvent::new(MOUSE, 0.0, 0.0));
        }
        if input.escape {
            self.controller.pointer_cancel(PointerEvent::new(MOUSE, 0.0, 0.0));
        }
        for (delta, zoom_modifier) in input.wheel {
            self.controller.wheel(snapshot, delta, zoom_modifier, bus);
        }
        if input.delete && self.controller.state().is_idle() {
            bus.publish(kgraph_events::Event::DeleteSelection);
        }
    }

    fn draw_edge(
        &self,
        painter: &egui::Painter,
        snapshot: &CanvasSnapshot<'_>,
        doc: &EditorDocument,
        edge: &EdgeGeometry,
        settings: &CanvasSettings,
        palette: &CanvasPalette,
    ) {
        let selected = doc.selected_edge() == Some(&edge.edge_id);
        let color = to_color32(if selected { COLOR_EDGE_SELECTED } else { COLOR_EDGE });
        let width = (if selected { 2.5 } else { 1.5 }) * snapshot.view.zoom.max(0.5);
        let c = edge.curve.curve;
        let points = [c.start, c.control1, c.control2, c.end].map(|p| to_screen(snapshot, p));
        painter.add(CubicBezierShape::from_points_stroke(
            points,
            false,
            Color32::TRANSPARENT,
            Stroke::new(width, color),
        ));

        let handle = to_screen(snapshot, edge.handle);
        if selected {
            painter.circle_filled(handle, 5.0, color);
        }
        if settings.show_edge_labels && !edge.label.is_empty() {
            painter.text(
                handle - egui::vec2(0.0, 16.0),
                egui::Align2::CENTER_CENTER,
                &edge.label,
                egui::FontId::proportional(11.0 * snapshot.view.zoom),
                palette.text,
            );
        }
    }
}

fn to_screen(snapshot: &CanvasSnapshot<'_>, world: Vec2) -> Pos2 {
    let screen = snapshot.view.world_to_screen(world) + snapshot.origin;
    Pos2::new(screen.x, screen.y)
}

fn draw_grid(painter: &egui::Painter, rect: egui::Rect, view: ViewTransform, color: Color32) {
    let step = GRID_SPACING * view.zoom;
    if step < 8.0 {
        return;
    }
    let stroke = Stroke::new(1.0, color);
    let mut x = rect.min.x + view.pan.x.rem_euclid(step);
    while x < rect.max.x {
        painter.vline(x, rect.y_range(), stroke);
        x += step;
    }
    let mut y = rect.min.y + view.pan.y.rem_euclid(step);
    while y < rect.max.y {
        painter.hline(rect.x_range(), y, stroke);
        y += step;
    }
}

fn draw_node(
    painter: &egui::Painter,
    snapshot: &CanvasSnapshot<'_>,
    node: &EditorNode,
    selected: bool,
) {
    let zoom = snapshot.view.zoom;
    let world = node.rect();
    let rect = egui::Rect::from_min_max(
        to_screen(snapshot, world.min),
        to_screen(snapshot, world.max),
    );
    let colors = node_colors(node.node_type, selected);
    let radius = NODE_CORNER_RADIUS * zoom;

    painter.rect_filled(rect, radius, to_color32(colors.fill));
    painter.rect_stroke(
        rect,
        radius,
        Stroke::new(if selected { 2.5 } else { 1.0 }, to_color32(colors.border)),
        egui::StrokeKind::Middle,
    );
    painter.text(
        rect.center() - egui::vec2(0.0, 10.0 * zoom),
        egui::Align2::CENTER_CENTER,
        &node.label,
        egui::FontId::proportional(14.0 * zoom),
        to_color32(colors.text),
    );
    let subtitle = if node.sub_type.is_empty() {
        node.node_type.label().to_string()
    } else {
        format!("{} · {}", node.node_type.label(), node.sub_type)
    };
    painter.text(
        rect.center() + egui::vec2(0.0, 14.0 * zoom),
        egui::Align2::CENTER_CENTER,
        subtitle,
        egui::FontId::proportional(10.0 * zoom),
        to_color32(colors.text.darken(0.2)),
    );

    for anchor in [node.target_anchor(), node.source_anchor()] {
        let center = to_screen(snapshot, anchor);
        let radius = HANDLE_RADIUS * zoom * 0.6;
        painter.circle_filled(center, radius, to_color32(COLOR_HANDLE));
        painter.circle_stroke(center, radius, Stroke::new(1.0, to_color32(colors.border)));
    }
}
