use eframe::egui;
use egui_phosphor::regular as ph;
use kgraph_canvas::{EditorDocument, ExploredGraph};
use kgraph_core::{EditorEdge, EditorNode, NODE_HEIGHT, NODE_WIDTH, NodeType, Vec2};
use kgraph_events::{Event, EventBus, EventListener};

use crate::components::detail_panel;
use crate::components::editor_canvas::EditorCanvas;
use crate::components::explorer_window::ExplorerWindow;
use crate::settings::{AppSettings, ThemeMode};
use crate::theme::Theme;

pub struct KnowledgeGraphApp {
    settings: AppSettings,
    theme: Theme,
    needs_theme_apply: bool,
    document: EditorDocument,
    event_bus: EventBus,
    canvas: EditorCanvas,
    explorer: ExplorerWindow,
    viewport: Vec2,
    show_settings: bool,
}

impl KnowledgeGraphApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let theme = Theme::new(settings.theme);
        theme.apply(&cc.egui_ctx);
        cc.egui_ctx.set_pixels_per_point(settings.ui_scale);
        tracing::info!("Applied theme {:?}", settings.theme);

        let mut document = sample_document();
        document.set_pan_zoom(settings.canvas.pan_zoom());

        Self {
            canvas: EditorCanvas::new(&settings.canvas),
            explorer: ExplorerWindow::new(settings.explorer),
            theme,
            needs_theme_apply: false,
            document,
            event_bus: EventBus::new(),
            viewport: Vec2::ZERO,
            show_settings: false,
            settings,
        }
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::OpenExplorer => {
                let graph =
                    ExploredGraph::from_editor(self.document.nodes(), self.document.edges());
                tracing::info!("Opening explorer with {} node(s)", graph.nodes.len());
                self.explorer.open(graph, Vec2::new(720.0, 480.0));
            }
            Event::CloseExplorer => self.explorer.close(),
            other => self.document.handle_event(other),
        }
    }

    fn create_node(&mut self, node_type: NodeType) {
        let center = self.document.view().screen_to_world(self.viewport / 2.0);
        let position = center - Vec2::new(NODE_WIDTH / 2.0, NODE_HEIGHT / 2.0);
        let count = self.document.nodes().len() + 1;
        let id = self.document.create_node(
            node_type,
            "",
            format!("{} {}", node_type.label(), count),
            position,
        );
        self.document.select_node(Some(id));
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button(format!("{} Technical", ph::PLUS)).clicked() {
                self.create_node(NodeType::Technical);
            }
            if ui.button(format!("{} Business", ph::PLUS)).clicked() {
                self.create_node(NodeType::Business);
            }
            ui.separator();
            if ui.button(ph::MAGNIFYING_GLASS_PLUS).on_hover_text("Zoom in").clicked() {
                self.event_bus.publish(Event::ZoomIn);
            }
            if ui.button(ph::MAGNIFYING_GLASS_MINUS).on_hover_text("Zoom out").clicked() {
                self.event_bus.publish(Event::ZoomOut);
            }
            if ui.button(ph::CORNERS_OUT).on_hover_text("Fit to content").clicked() {
                self.event_bus.publish(Event::ZoomToFit);
            }
            if ui.button(ph::ARROW_COUNTER_CLOCKWISE).on_hover_text("Reset view").clicked() {
                self.event_bus.publish(Event::ZoomReset);
            }
            ui.label(format!("{:.0}%", self.document.view().zoom * 100.0));
            ui.separator();
            let explorer_label = if self.explorer.is_open() {
                format!("{} Close explorer", ph::SHARE_NETWORK)
            } else {
                format!("{} Explore", ph::SHARE_NETWORK)
            };
            if ui.button(explorer_label).clicked() {
                let event = if self.explorer.is_open() {
                    Event::CloseExplorer
                } else {
                    Event::OpenExplorer
                };
                self.event_bus.publish(event);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.toggle_value(&mut self.show_settings, ph::GEAR);
            });
        });
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let before = self.settings.clone();
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                let settings = &mut self.settings;
                ui.heading("Appearance");
                egui::ComboBox::from_label("Theme")
                    .selected_text(settings.theme.label())
                    .show_ui(ui, |ui| {
                        for mode in ThemeMode::ALL {
                            ui.selectable_value(&mut settings.theme, mode, mode.label());
                        }
                    });
                ui.add(egui::Slider::new(&mut settings.ui_scale, 0.75..=2.0).text("UI scale"));

                ui.heading("Canvas");
                ui.checkbox(&mut settings.canvas.show_grid, "Show grid");
                ui.checkbox(&mut settings.canvas.show_edge_labels, "Show edge labels");
                ui.add(
                    egui::Slider::new(&mut settings.canvas.zoom_step, 0.05..=0.5).text("Zoom step"),
                );
                ui.add(
                    egui::Slider::new(&mut settings.canvas.edge_hit_tolerance, 2.0..=20.0)
                        .text("Edge hit tolerance"),
                );

                ui.heading("Explorer");
                let params = &mut settings.explorer;
                ui.add(
                    egui::Slider::new(&mut params.repulsion, 1000.0..=20000.0).text("Repulsion"),
                );
                ui.add(
                    egui::Slider::new(&mut params.rest_length, 40.0..=300.0).text("Rest length"),
                );
                ui.add(egui::Slider::new(&mut params.stiffness, 0.01..=0.3).text("Stiffness"));
                ui.add(egui::Slider::new(&mut params.gravity, 0.0..=0.05).text("Gravity"));
                ui.add(egui::Slider::new(&mut params.damping, 0.1..=0.95).text("Damping"));
            });
        self.show_settings = open;

        if self.settings != before {
            self.canvas.apply_settings(&self.settings.canvas);
            self.document.set_pan_zoom(self.settings.canvas.pan_zoom());
            self.explorer.set_params(self.settings.explorer);
            if self.settings.theme != before.theme || self.settings.ui_scale != before.ui_scale {
                self.needs_theme_apply = true;
            }
        }
    }
}

impl eframe::App for KnowledgeGraphApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.settings.save();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.needs_theme_apply {
            self.theme = Theme::new(self.settings.theme);
            self.theme.apply(ctx);
            ctx.set_pixels_per_point(self.settings.ui_scale);
            self.needs_theme_apply = false;
        }

        // Dispatch pending events
        let rx = self.event_bus.receiver();
        while let Ok(event) = rx.try_recv() {
            self.handle_event(&event);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                detail_panel::show(ui, &mut self.document, &self.event_bus);
            });

        self.settings_window(ctx);

        let palette = self.theme.canvas_palette();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport = self.canvas.show(
                    ui,
                    &self.document,
                    &mut self.event_bus,
                    &self.settings.canvas,
                    &palette,
                );
            });
        self.document.set_viewport_size(self.viewport);

        self.explorer.show(ctx);
    }
}

/// Starter graph shown on first launch.
fn sample_document() -> EditorDocument {
    let mut customer = EditorNode::new("customer", "Customer", 80.0, 120.0);
    customer.node_type = NodeType::Business;
    customer.sub_type = "entity".to_string();
    let mut order = EditorNode::new("order", "Order", 420.0, 120.0);
    order.node_type = NodeType::Business;
    order.sub_type = "entity".to_string();
    let mut orders_table = EditorNode::new("orders_table", "orders", 420.0, 360.0);
    orders_table.sub_type = "table".to_string();

    let mut places = EditorEdge::new("places", "customer", "order");
    places.label = "places".to_string();
    let mut stored_in = EditorEdge::new("stored_in", "order", "orders_table");
    stored_in.label = "stored in".to_string();

    EditorDocument::from_parts(vec![customer, order, orders_table], vec![places, stored_in])
}
