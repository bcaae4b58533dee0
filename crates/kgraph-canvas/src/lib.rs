pub mod document;
pub mod edge_layout;
pub mod explorer;
pub mod force_layout;
pub mod geometry;
pub mod hit_tester;
pub mod interaction;
pub mod pan_zoom;
pub mod render;
pub mod style;

pub use document::EditorDocument;
pub use edge_layout::{EdgeGeometry, EdgeLayout, parallel_index, parallel_indices};
pub use explorer::{ExplorerView, FrameLoop, FrameToken};
pub use force_layout::{
    Body, ExploredEdge, ExploredGraph, ExploredNode, ForceParams, ForceSimulation,
};
pub use geometry::{
    CubicBezier, EdgeCurve, bezier_point, get_curve, parallel_offset, screen_to_world,
    self_loop_height, world_to_screen,
};
pub use hit_tester::{HitTarget, HitTester, SpatialHitTester};
pub use interaction::{
    CanvasController, CanvasSnapshot, InteractionState, PointerEvent, PointerId,
};
pub use pan_zoom::PanZoomController;
pub use render::{DrawCommand, label_lines, render};
pub use style::{Color, NodeColors, label_color, node_colors};
