//! Display-independent draw list for the explorer.

use crate::explorer::ExplorerView;
use crate::force_layout::{ExploredGraph, ForceSimulation};
use crate::style::{
    COLOR_EXPLORER_BACKGROUND, COLOR_EXPLORER_EDGE, COLOR_EXPLORER_TEXT, COLOR_FOCUS_BORDER,
    Color, gradient_stops, label_color,
};
use kgraph_core::{NodeId, Vec2, ViewTransform};

/// Labels longer than this are broken on underscores.
pub const LABEL_WRAP_LEN: usize = 12;
pub const EDGE_WIDTH: f32 = 1.5;
pub const LABEL_FONT_SIZE: f32 = 11.0;

/// One drawing operation. Everything after `Transform` is in world space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Transform(ViewTransform),
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        inner: Color,
        outer: Color,
        stroke: Option<Color>,
    },
    Text {
        center: Vec2,
        lines: Vec<String>,
        color: Color,
        size: f32,
    },
}

/// Split a long label on underscores; short ones stay on one line.
pub fn label_lines(label: &str) -> Vec<String> {
    if label.chars().count() <= LABEL_WRAP_LEN || !label.contains('_') {
        return vec![label.to_string()];
    }
    label
        .split('_')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Draw list for one frame: clear, transform, edges, then nodes on top.
pub fn render(
    simulation: &ForceSimulation,
    graph: &ExploredGraph,
    view: ViewTransform,
    selected: Option<&NodeId>,
) -> Vec<DrawCommand> {
    let bodies = simulation.bodies();
    let mut commands = Vec::with_capacity(2 + simulation.springs().len() + bodies.len() * 2);
    commands.push(DrawCommand::Clear(COLOR_EXPLORER_BACKGROUND));
    commands.push(DrawCommand::Transform(view));

    for &(a, b) in simulation.springs() {
        commands.push(DrawCommand::Line {
            from: bodies[a].position,
            to: bodies[b].position,
            color: COLOR_EXPLORER_EDGE,
            width: EDGE_WIDTH,
        });
    }

    let radius = simulation.params().node_radius;
    for (id, body) in simulation.ids().iter().zip(bodies) {
        let node = graph.node(id);
        let (inner, outer) = gradient_stops(label_color(node.and_then(|n| n.primary_label())));
        commands.push(DrawCommand::Circle {
            center: body.position,
            radius,
            inner,
            outer,
            stroke: (selected == Some(id)).then_some(COLOR_FOCUS_BORDER),
        });
        let name = node.map(|n| n.display_name()).unwrap_or_else(|| id.to_string());
        commands.push(DrawCommand::Text {
            center: body.position,
            lines: label_lines(&name),
            color: COLOR_EXPLORER_TEXT,
            size: LABEL_FONT_SIZE,
        });
    }
    commands
}

impl ExplorerView {
    /// Draw list for the current frame; empty when nothing is loaded.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        match (self.simulation(), self.graph()) {
            (Some(simulation), Some(graph)) => {
                render(simulation, graph, self.view(), self.selected())
            }
            _ => Vec::new(),
        }
    }
}
